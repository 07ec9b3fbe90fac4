//! Outbound side of a client connection.

use async_trait::async_trait;

use super::error::DeliveryError;

/// Write half of a live client connection.
///
/// The registry owns one sink per registered connection and the dispatch loop is
/// the only writer once a connection is registered.
#[async_trait]
pub trait ConnectionSink: Send {
    /// Send one text payload to the peer.
    async fn send_text(&mut self, payload: &str) -> Result<(), DeliveryError>;

    /// Close the connection. Errors are ignored; the peer is already being dropped.
    async fn close(&mut self) {}
}
