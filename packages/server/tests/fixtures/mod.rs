//! Shared fixtures for integration tests.
//!
//! `TestServer` runs the real server in-process on an ephemeral port with a
//! temporary message log directory and public directory.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use parley_server::{ServerConfig, ServerError, serve};
use tempfile::TempDir;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub const READ_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TestServer {
    pub addr: SocketAddr,
    log_dir: PathBuf,
    _owned_log_dir: Option<TempDir>,
    _public_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(&[]).await
    }

    pub async fn start_with(extra_args: &[&str]) -> Self {
        let log_dir = tempfile::tempdir().expect("Failed to create log dir");
        let mut server = Self::start_in(log_dir.path(), extra_args).await;
        server._owned_log_dir = Some(log_dir);
        server
    }

    /// Start with the message log stored in `log_dir`, which outlives the server.
    pub async fn start_in(log_dir: &Path, extra_args: &[&str]) -> Self {
        let public_dir = tempfile::tempdir().expect("Failed to create public dir");
        std::fs::write(public_dir.path().join("index.html"), "<h1>parley</h1>")
            .expect("Failed to write index.html");

        let log_dir_arg = log_dir.to_string_lossy().to_string();
        let public_dir_arg = public_dir.path().to_string_lossy().to_string();
        let mut args = vec![
            "parley-server",
            "--log-dir",
            log_dir_arg.as_str(),
            "--public-dir",
            public_dir_arg.as_str(),
        ];
        args.extend_from_slice(extra_args);
        let config = ServerConfig::try_parse_from(args).expect("Invalid test config");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, config, async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            addr,
            log_dir: log_dir.to_path_buf(),
            _owned_log_dir: None,
            _public_dir: public_dir,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/websocket", self.addr)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join("chat_messages.jsonl")
    }

    /// Lines currently in the message log file
    pub fn log_records(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Registered connection count as reported by the health endpoint
    pub async fn connections(&self) -> u64 {
        let body: serde_json::Value = reqwest::get(format!("{}/api/health", self.base_url()))
            .await
            .expect("Failed to query health")
            .json()
            .await
            .expect("Failed to parse health");
        body["connections"].as_u64().expect("connections missing")
    }

    /// Poll until exactly `expected` connections are registered.
    pub async fn wait_for_connections(&self, expected: u64) {
        let deadline = tokio::time::Instant::now() + READ_TIMEOUT;
        loop {
            let current = self.connections().await;
            if current == expected {
                return;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {expected} connections, still {current}"
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    /// Stop the server and return its result.
    pub async fn stop(mut self) -> Result<(), ServerError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.handle.take() {
            Some(handle) => handle.await.expect("server task panicked"),
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A WebSocket chat client used by the tests
pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        Self { stream }
    }

    pub async fn send_chat(&mut self, username: &str, text: &str) {
        let payload = serde_json::json!({"username": username, "text": text}).to_string();
        self.send_raw(&payload).await;
    }

    pub async fn send_raw(&mut self, payload: &str) {
        self.stream
            .send(Message::text(payload))
            .await
            .expect("Failed to send");
    }

    /// Next text payload, skipping control frames.
    pub async fn recv_text(&mut self) -> String {
        loop {
            let frame = timeout(READ_TIMEOUT, self.stream.next())
                .await
                .expect("Timed out waiting for a message")
                .expect("Stream ended")
                .expect("WebSocket error");
            match frame {
                Message::Text(text) => return text.as_str().to_string(),
                Message::Ping(_) | Message::Pong(_) => continue,
                other => panic!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Receive `count` text payloads.
    pub async fn recv_many(&mut self, count: usize) -> Vec<String> {
        let mut received = Vec::with_capacity(count);
        for _ in 0..count {
            received.push(self.recv_text().await);
        }
        received
    }

    /// Whether the server ends the connection within the read timeout.
    pub async fn closed_by_server(&mut self) -> bool {
        loop {
            match timeout(READ_TIMEOUT, self.stream.next()).await {
                Err(_) => return false,
                Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
                Ok(Some(Ok(_))) => continue,
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    /// Drop the TCP connection without a close handshake.
    pub fn abort(self) {
        drop(self.stream);
    }
}
