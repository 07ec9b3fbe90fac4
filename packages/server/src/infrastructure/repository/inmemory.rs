//! InMemory MessageLog 実装
//!
//! `Vec<String>` をストレージとして使用する。プロセス終了で内容は失われるため、
//! テストと `memory` バックエンドでのみ使用します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{MessageLog, MessageLogError};

#[derive(Default)]
struct State {
    records: Vec<String>,
    /// Set when the log should reject appends
    unavailable: Option<String>,
}

/// インメモリ MessageLog 実装
pub struct InMemoryMessageLog {
    name: String,
    state: Mutex<State>,
}

impl InMemoryMessageLog {
    /// 新しい InMemoryMessageLog を作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// 保存済みレコードのコピーを取得
    pub async fn records(&self) -> Vec<String> {
        self.state.lock().await.records.clone()
    }

    /// 以降の append を `reason` で失敗させる（`None` で復旧）
    pub async fn set_unavailable(&self, reason: Option<String>) {
        self.state.lock().await.unavailable = reason;
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&self, record: &str) -> Result<(), MessageLogError> {
        let mut state = self.state.lock().await;
        if let Some(reason) = &state.unavailable {
            return Err(MessageLogError::Unavailable {
                name: self.name.clone(),
                reason: reason.clone(),
            });
        }
        state.records.push(record.to_string());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<String>, MessageLogError> {
        let state = self.state.lock().await;
        let start = state.records.len().saturating_sub(limit);
        Ok(state.records[start..].to_vec())
    }
}
