//! Client configuration.

use clap::Parser;

/// Chat client for a Parley relay server
#[derive(Debug, Clone, Parser)]
#[command(name = "parley-client", version, about, long_about = None)]
pub struct ClientConfig {
    /// WebSocket URL of the relay
    #[arg(long, env = "PARLEY_URL", default_value = "ws://127.0.0.1:8080/websocket")]
    pub url: String,

    /// Name shown next to your messages
    #[arg(short, long, env = "PARLEY_USERNAME")]
    pub username: String,
}
