//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//! - コネクションの登録と、有効な場合の履歴リプレイ
//!
//! ### どのような状況を想定しているか
//! - 正常系：履歴なしでの登録、履歴リプレイ後の登録
//! - 異常系：履歴リプレイ中に切断された場合は登録しない
//! - エッジケース：履歴の読み出しに失敗した場合はリプレイせずに登録する

use std::{sync::Arc, time::Duration};

use crate::{
    domain::{ConnectionId, ConnectionSink, MessageLog},
    infrastructure::registry::{ConnectionRegistry, close_within, send_within},
};

use super::error::ConnectError;

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    registry: ConnectionRegistry,
    log: Arc<dyn MessageLog>,
    /// 接続時にリプレイする履歴の最大件数（0 で無効）
    history_limit: usize,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(registry: ConnectionRegistry, log: Arc<dyn MessageLog>, history_limit: usize) -> Self {
        Self {
            registry,
            log,
            history_limit,
        }
    }

    /// 接続を実行
    ///
    /// Registry のロックを保持したまま履歴をリプレイしてから登録するため、
    /// 同じメッセージがリプレイと fan-out の両方で届くことはない。
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - リプレイした履歴の件数
    /// * `Err(ConnectError)` - リプレイ中にコネクションが失われた（未登録）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        mut sink: Box<dyn ConnectionSink>,
    ) -> Result<usize, ConnectError> {
        let mut registry = self.registry.lock().await;

        let send_timeout = registry.send_timeout();
        let replayed = match self.replay_history(sink.as_mut(), send_timeout).await {
            Ok(replayed) => replayed,
            Err(e) => {
                close_within(sink.as_mut(), send_timeout).await;
                return Err(e);
            }
        };

        registry.insert(connection_id, sink);
        tracing::info!(
            connection_id = %connection_id,
            replayed,
            connections = registry.len(),
            "Client connected"
        );

        Ok(replayed)
    }

    async fn replay_history(
        &self,
        sink: &mut dyn ConnectionSink,
        send_timeout: Duration,
    ) -> Result<usize, ConnectError> {
        if self.history_limit == 0 {
            return Ok(0);
        }

        let records = match self.log.recent(self.history_limit).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history; skipping replay");
                return Ok(0);
            }
        };

        for record in &records {
            send_within(sink, record, send_timeout).await?;
        }
        Ok(records.len())
    }
}
