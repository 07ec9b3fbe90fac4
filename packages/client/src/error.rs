//! Client error definitions.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not open the WebSocket connection
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// Sending a message failed
    #[error("failed to send message: {0}")]
    Send(#[source] tungstenite::Error),

    /// A message could not be encoded
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    /// The input thread could not be started
    #[error("failed to start input reader: {0}")]
    Input(#[from] std::io::Error),
}
