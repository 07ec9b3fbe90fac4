//! Server configuration from command-line flags and environment variables.

use std::{
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use clap::{Parser, ValueEnum};

use crate::{
    domain::{MessageLog, MessageLogError},
    infrastructure::repository::{FileMessageLog, InMemoryMessageLog},
    usecase::LogFailurePolicy,
};

/// Storage backend of the message log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogBackend {
    /// JSON-lines file under `--log-dir`
    #[default]
    File,
    /// Process memory; history is lost on restart
    Memory,
}

/// Chat relay server: WebSocket fan-out with a durable message log
#[derive(Debug, Clone, Parser)]
#[command(name = "parley-server", version, about, long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory of static files served on every other path
    #[arg(long, env = "PUBLIC_DIR", default_value = "./public")]
    pub public_dir: PathBuf,

    /// Message log backend
    #[arg(long, env = "MESSAGE_LOG_BACKEND", value_enum, default_value_t = LogBackend::File)]
    pub log_backend: LogBackend,

    /// Directory holding the message log file
    #[arg(long, env = "MESSAGE_LOG_DIR", default_value = "./data")]
    pub log_dir: PathBuf,

    /// Name of the message log
    #[arg(long, env = "MESSAGE_LOG_NAME", default_value = "chat_messages")]
    pub log_name: String,

    /// Behaviour when appending to the message log fails
    #[arg(long, env = "LOG_FAILURE_POLICY", value_enum, default_value_t = LogFailurePolicy::Continue)]
    pub log_failure_policy: LogFailurePolicy,

    /// Messages buffered between readers and the dispatch loop before readers wait
    #[arg(long, env = "QUEUE_CAPACITY", default_value = "1024")]
    pub queue_capacity: NonZeroUsize,

    /// Recent messages replayed to each new connection (0 disables replay)
    #[arg(long, env = "HISTORY_LIMIT", default_value_t = 0)]
    pub history_limit: usize,

    /// Milliseconds a single write to a client may take before the client is dropped
    #[arg(long, env = "SEND_TIMEOUT_MS", default_value = "5000")]
    pub send_timeout_ms: NonZeroU64,

    /// Allowed `Origin` for WebSocket upgrades; repeat for several. Any origin when unset
    #[arg(long = "allowed-origin", env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// `host:port` as configured
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Deadline for each write or close on a client connection
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms.get())
    }

    /// Open the configured message log backend
    pub async fn open_message_log(&self) -> Result<Arc<dyn MessageLog>, MessageLogError> {
        let log: Arc<dyn MessageLog> = match self.log_backend {
            LogBackend::File => Arc::new(FileMessageLog::open(&self.log_dir, &self.log_name).await?),
            LogBackend::Memory => {
                tracing::warn!("Using in-memory message log; history will not survive restarts");
                Arc::new(InMemoryMessageLog::new(self.log_name.clone()))
            }
        };
        Ok(log)
    }
}
