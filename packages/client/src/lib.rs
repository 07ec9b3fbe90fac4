//! Interactive command-line client for the Parley chat relay.

pub mod config;
pub mod error;
pub mod format;
pub mod session;

// Re-export entry points
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::run_client;
