//! Server state shared by the handlers.

use std::sync::Arc;

use crate::{
    domain::MessageLog, infrastructure::registry::ConnectionRegistry,
    usecase::SubmitMessageUseCase,
};

/// Shared application state
pub struct AppState {
    /// Live connections (shared with the dispatch loop)
    pub registry: ConnectionRegistry,
    /// Message log, read for history replay
    pub log: Arc<dyn MessageLog>,
    /// Entry point of the dispatch loop channel
    pub submitter: SubmitMessageUseCase,
    /// Records replayed to each new connection (0 disables replay)
    pub history_limit: usize,
    /// Accepted `Origin` header values; empty accepts any origin
    pub allowed_origins: Vec<String>,
}

impl AppState {
    /// Whether an upgrade request with this `Origin` header may connect
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        origin.is_some_and(|origin| self.allowed_origins.iter().any(|allowed| allowed == origin))
    }
}
