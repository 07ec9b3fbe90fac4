//! Connection registry
//!
//! Tracks every live connection together with its outbound sink. All access goes
//! through one async mutex: the acceptor inserts, inbound readers remove, and the
//! dispatch loop holds the lock for a whole fan-out pass so that no connection is
//! added halfway through a broadcast.
//!
//! Every write and close on a sink is bounded by the send timeout. A peer that
//! stops reading is removed instead of holding the lock indefinitely.

use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, MutexGuard},
    time::timeout,
};

use crate::domain::{ConnectionId, ConnectionSink, DeliveryError};

type Members = HashMap<ConnectionId, Box<dyn ConnectionSink>>;

/// Default deadline for a single write or close on one connection
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the set of registered connections
#[derive(Clone)]
pub struct ConnectionRegistry {
    members: Arc<Mutex<Members>>,
    send_timeout: Duration,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::with_send_timeout(DEFAULT_SEND_TIMEOUT)
    }
}

/// Outcome of one fan-out pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FanoutReport {
    /// Connections the payload was written to
    pub delivered: Vec<ConnectionId>,
    /// Connections removed after a failed write, with the classified failure
    pub removed: Vec<(ConnectionId, DeliveryError)>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        Self {
            members: Arc::new(Mutex::new(Members::new())),
            send_timeout,
        }
    }

    /// Add a connection. Callers guarantee a single registration per connection.
    pub async fn register(&self, id: ConnectionId, sink: Box<dyn ConnectionSink>) {
        self.lock().await.insert(id, sink);
    }

    /// Remove a connection. Returns `false` if it was not registered.
    pub async fn unregister(&self, id: &ConnectionId) -> bool {
        self.lock().await.remove(id).await
    }

    /// Exclusive view of the full membership for one fan-out pass.
    pub async fn snapshot_for_fanout(&self) -> RegistryGuard<'_> {
        self.lock().await
    }

    /// Exclusive access to the registry, e.g. to replay history before inserting.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        RegistryGuard {
            members: self.members.lock().await,
            send_timeout: self.send_timeout,
        }
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.members.lock().await.contains_key(id)
    }
}

/// Write `payload` to `sink`, failing with [`DeliveryError::TimedOut`] after `limit`.
pub async fn send_within(
    sink: &mut dyn ConnectionSink,
    payload: &str,
    limit: Duration,
) -> Result<(), DeliveryError> {
    match timeout(limit, sink.send_text(payload)).await {
        Ok(sent) => sent,
        Err(_) => Err(DeliveryError::TimedOut(limit)),
    }
}

/// Close `sink`, giving up after `limit`.
pub async fn close_within(sink: &mut dyn ConnectionSink, limit: Duration) -> bool {
    timeout(limit, sink.close()).await.is_ok()
}

/// Locked registry. Other registry operations wait until this is dropped.
pub struct RegistryGuard<'a> {
    members: MutexGuard<'a, Members>,
    send_timeout: Duration,
}

impl RegistryGuard<'_> {
    pub fn insert(&mut self, id: ConnectionId, sink: Box<dyn ConnectionSink>) {
        if self.members.insert(id, sink).is_some() {
            tracing::warn!(connection_id = %id, "Connection registered twice; replaced sink");
        }
        tracing::debug!(
            connection_id = %id,
            connections = self.members.len(),
            "Connection registered"
        );
    }

    /// Remove and close a connection. Returns `false` if it was not registered.
    pub async fn remove(&mut self, id: &ConnectionId) -> bool {
        match self.members.remove(id) {
            Some(mut sink) => {
                if !close_within(sink.as_mut(), self.send_timeout).await {
                    tracing::warn!(connection_id = %id, "Timed out closing connection");
                }
                tracing::debug!(
                    connection_id = %id,
                    connections = self.members.len(),
                    "Connection unregistered"
                );
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Deadline applied to each write and close
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Write `payload` to every registered connection.
    ///
    /// A failed write removes the connection before the guard is released; it is
    /// never retried. Expected failures (peer going away, stream ended) are logged
    /// at debug level, anything else at error level. A write that exceeds the send
    /// timeout counts as an unexpected failure.
    pub async fn deliver(&mut self, payload: &str) -> FanoutReport {
        let mut report = FanoutReport::default();
        let send_timeout = self.send_timeout;

        for (id, sink) in self.members.iter_mut() {
            match send_within(sink.as_mut(), payload, send_timeout).await {
                Ok(()) => report.delivered.push(*id),
                Err(e) => {
                    if e.is_expected() {
                        tracing::debug!(connection_id = %id, reason = %e, "Dropping departed connection");
                    } else {
                        tracing::error!(connection_id = %id, error = %e, "Failed to deliver message");
                    }
                    report.removed.push((*id, e));
                }
            }
        }

        for (id, _) in &report.removed {
            self.remove(id).await;
        }

        report
    }
}
