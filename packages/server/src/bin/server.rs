//! Chat relay server with WebSocket broadcast and a durable message log.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parley-server -- --port 8080
//! ```

use clap::Parser;
use parley_server::{ServerConfig, run_server};
use parley_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::parse();

    // Run the server
    if let Err(e) = run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
