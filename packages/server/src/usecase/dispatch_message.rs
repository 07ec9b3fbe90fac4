//! UseCase: メッセージ配信ループ
//!
//! プロセスに1つだけ存在する直列化ポイント。全 Inbound Reader から単一の
//! チャンネル経由でメッセージを受け取り、到着順に
//!
//! 1. シリアライズして MessageLog に追記し、
//! 2. Registry に登録されている全コネクションへ fan-out する。
//!
//! 永続化の順序 = fan-out の順序 = チャンネル到着順。

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{ChatMessage, MessageLog},
    infrastructure::{
        dto::websocket::ChatMessageDto,
        registry::{ConnectionRegistry, FanoutReport},
    },
};

use super::error::DispatchError;

/// What to do when the message log rejects an append
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFailurePolicy {
    /// Report the failure and keep fanning out without persistence
    #[default]
    Continue,
    /// Stop the dispatch loop, which shuts the server down
    Halt,
}

/// Result of dispatching one message
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Whether the message reached the log
    pub persisted: bool,
    pub fanout: FanoutReport,
}

/// The single consumer of submitted messages
pub struct DispatchLoop {
    log: Arc<dyn MessageLog>,
    registry: ConnectionRegistry,
    receiver: mpsc::Receiver<ChatMessage>,
    policy: LogFailurePolicy,
}

impl DispatchLoop {
    pub fn new(
        log: Arc<dyn MessageLog>,
        registry: ConnectionRegistry,
        receiver: mpsc::Receiver<ChatMessage>,
        policy: LogFailurePolicy,
    ) -> Self {
        Self {
            log,
            registry,
            receiver,
            policy,
        }
    }

    /// Process messages until every submitter is gone.
    ///
    /// Returns an error only under [`LogFailurePolicy::Halt`].
    pub async fn run(mut self) -> Result<(), DispatchError> {
        tracing::info!(policy = ?self.policy, "Dispatch loop started");

        while let Some(message) = self.receiver.recv().await {
            self.dispatch(&message).await?;
        }

        tracing::info!("Dispatch loop stopped: no submitters left");
        Ok(())
    }

    /// Persist one message, then fan it out.
    ///
    /// The registry stays locked from the append until fan-out completes, so a
    /// client connecting concurrently sees the message either in its history
    /// replay or in the fan-out, never both.
    pub async fn dispatch(&self, message: &ChatMessage) -> Result<DispatchOutcome, DispatchError> {
        let payload = match ChatMessageDto::from(message).encode() {
            Ok(payload) => payload,
            Err(e) => {
                let e = DispatchError::Serialize(e);
                self.handle_failure(e)?;
                return Ok(DispatchOutcome::default());
            }
        };

        let mut members = self.registry.snapshot_for_fanout().await;

        let persisted = match self.log.append(&payload).await {
            Ok(()) => true,
            Err(e) => {
                self.handle_failure(e.into())?;
                false
            }
        };

        let fanout = members.deliver(&payload).await;
        drop(members);

        tracing::debug!(
            username = message.username(),
            persisted,
            delivered = fanout.delivered.len(),
            removed = fanout.removed.len(),
            "Dispatched message"
        );

        Ok(DispatchOutcome { persisted, fanout })
    }

    fn handle_failure(&self, error: DispatchError) -> Result<(), DispatchError> {
        match self.policy {
            LogFailurePolicy::Continue => {
                tracing::error!(error = %error, "Message not persisted; continuing with live delivery");
                Ok(())
            }
            LogFailurePolicy::Halt => {
                tracing::error!(error = %error, "Message not persisted; halting dispatch loop");
                Err(error)
            }
        }
    }
}
