//! Domain layer error definitions.

use thiserror::Error;

/// Errors raised by a [`MessageLog`](super::MessageLog) backend
#[derive(Debug, Error)]
pub enum MessageLogError {
    /// Underlying storage I/O failed
    #[error("message log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused the operation
    #[error("message log `{name}` is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Errors raised while writing to a single connection during fan-out
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The peer sent (or is in the middle of) a close handshake
    #[error("peer is going away")]
    GoingAway,

    /// The connection was already closed on our side
    #[error("connection already closed")]
    AlreadyClosed,

    /// The underlying stream ended, with or without a close handshake
    #[error("stream ended")]
    StreamEnded,

    /// The write did not complete within the send deadline
    #[error("write timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// Any other transport failure
    #[error("transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    /// Whether this failure is a normal side effect of a peer disconnecting.
    ///
    /// Expected failures are removed silently; anything else is reported.
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            DeliveryError::Transport(_) | DeliveryError::TimedOut(_)
        )
    }
}
