//! Parley chat relay server.
//!
//! Clients connect over WebSocket and submit `{"username", "text"}` messages.
//! A single dispatch loop orders every submission, appends it to a durable
//! message log and fans it out to all connected clients.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod server;
pub mod signal;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{run_server, serve};
