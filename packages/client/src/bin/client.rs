//! Interactive chat client for the Parley relay.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parley-client -- --username alice
//! ```

use clap::Parser;
use parley_client::{ClientConfig, run_client};
use parley_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    // Initialize tracing; keep the terminal quiet unless RUST_LOG says otherwise
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let config = ClientConfig::parse();

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
