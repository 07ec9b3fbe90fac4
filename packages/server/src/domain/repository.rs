//! Repository traits owned by the domain layer.
//!
//! Infrastructure provides the implementations; use cases only see these traits.

use async_trait::async_trait;

use super::error::MessageLogError;

/// Durable, ordered, append-only store of serialized chat messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Fixed name the log is keyed by.
    fn name(&self) -> &str;

    /// Append one serialized record at the end of the log.
    async fn append(&self, record: &str) -> Result<(), MessageLogError>;

    /// Return up to `limit` most recent records, oldest first.
    async fn recent(&self, limit: usize) -> Result<Vec<String>, MessageLogError>;
}
