//! UI 層: HTTP / WebSocket のエントリポイント

pub mod handler;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
