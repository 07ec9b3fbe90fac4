//! Server-level errors surfaced to the binary.

use thiserror::Error;

use crate::{domain::MessageLogError, usecase::DispatchError};

#[derive(Debug, Error)]
pub enum ServerError {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The message log could not be opened at startup
    #[error("failed to open message log: {0}")]
    MessageLog(#[from] MessageLogError),

    /// The HTTP server failed
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// The dispatch loop stopped with an error
    #[error("dispatch loop failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// The dispatch loop task panicked or was cancelled
    #[error("dispatch loop terminated unexpectedly")]
    DispatchAborted,
}
