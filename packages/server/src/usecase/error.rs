//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{DeliveryError, MessageLogError};

/// Errors raised while accepting a new connection
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    /// The connection died while history was being replayed to it
    #[error("failed to replay history: {0}")]
    HistoryDelivery(#[from] DeliveryError),
}

/// Errors raised while handing a message to the dispatch loop
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The dispatch loop has stopped and no longer accepts messages
    #[error("dispatch loop is not running")]
    DispatchClosed,
}

/// Errors that stop the dispatch loop
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The message could not be serialized
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The message log rejected the append and the policy is to halt
    #[error("failed to persist message: {0}")]
    Persist(#[from] MessageLogError),
}
