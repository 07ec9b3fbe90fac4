//! UseCase 層
//!
//! リレーのビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層の trait と Registry を操作します。

pub mod connect_client;
pub mod disconnect_client;
pub mod dispatch_message;
pub mod error;
pub mod submit_message;

pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use dispatch_message::{DispatchLoop, DispatchOutcome, LogFailurePolicy};
pub use error::{ConnectError, DispatchError, SubmitError};
pub use submit_message::SubmitMessageUseCase;
