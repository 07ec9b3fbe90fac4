//! UseCase: メッセージ投入処理
//!
//! Inbound Reader がデコードしたメッセージを Dispatch Loop のチャンネルへ渡す。
//! チャンネルが満杯の間は呼び出し元を待機させる（唯一のバックプレッシャー）。

use tokio::sync::mpsc;

use crate::domain::ChatMessage;

use super::error::SubmitError;

/// メッセージ投入のユースケース
#[derive(Clone)]
pub struct SubmitMessageUseCase {
    sender: mpsc::Sender<ChatMessage>,
}

impl SubmitMessageUseCase {
    /// 新しい SubmitMessageUseCase を作成
    pub fn new(sender: mpsc::Sender<ChatMessage>) -> Self {
        Self { sender }
    }

    /// メッセージを Dispatch Loop へ投入する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - チャンネルが受け付けた
    /// * `Err(SubmitError::DispatchClosed)` - Dispatch Loop が停止している
    pub async fn execute(&self, message: ChatMessage) -> Result<(), SubmitError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| SubmitError::DispatchClosed)
    }
}
