//! Route table.

use std::{path::Path, sync::Arc};

use axum::{Router, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{
    handler::{health_check, websocket_handler},
    state::AppState,
};

/// WebSocket endpoint path
pub const WEBSOCKET_PATH: &str = "/websocket";

/// Build the application router. Paths not matched by a route are served from
/// `public_dir`.
pub fn build_router(state: Arc<AppState>, public_dir: &Path) -> Router {
    Router::new()
        .route(WEBSOCKET_PATH, get(websocket_handler))
        .route("/api/health", get(health_check))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
