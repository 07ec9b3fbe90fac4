//! UseCase: クライアント切断処理
//!
//! Inbound Reader が終端エラーを観測したときに呼ばれ、Registry から
//! コネクションを取り除く。Dispatch Loop が先に削除していた場合は何もしない。

use crate::{domain::ConnectionId, infrastructure::registry::ConnectionRegistry};

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    registry: ConnectionRegistry,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// 切断を実行
    ///
    /// # Returns
    ///
    /// このコネクションが Registry に残っていて削除した場合は `true`
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        let removed = self.registry.unregister(connection_id).await;
        if removed {
            tracing::info!(connection_id = %connection_id, "Client disconnected");
        } else {
            tracing::debug!(
                connection_id = %connection_id,
                "Client already removed by dispatch loop"
            );
        }
        removed
    }
}
