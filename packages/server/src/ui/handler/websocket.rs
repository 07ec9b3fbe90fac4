//! WebSocket connection handlers.
//!
//! `websocket_handler` is the connection acceptor; `read_inbound` is the
//! per-connection inbound reader feeding the dispatch loop.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::Response,
};
use futures_util::stream::{Stream, StreamExt};
use thiserror::Error;

use crate::{
    domain::{ChatMessage, ConnectionId, ConnectionIdFactory},
    infrastructure::{dto::websocket::ChatMessageDto, websocket::WebSocketSink},
    ui::state::AppState,
    usecase::{ConnectClientUseCase, DisconnectClientUseCase, SubmitMessageUseCase},
};

/// Why an inbound reader stopped
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// The peer sent a close frame
    #[error("peer closed the connection (code: {0:?})")]
    Closed(Option<u16>),

    /// The stream ended without a close frame
    #[error("stream ended")]
    StreamEnded,

    /// The transport failed
    #[error("transport error: {0}")]
    Transport(String),

    /// A frame was not a valid chat message
    #[error("failed to decode message: {0}")]
    Decode(String),

    /// The dispatch loop no longer accepts messages
    #[error("dispatch loop is not running")]
    DispatchClosed,
}

impl ReadError {
    /// Whether this is an ordinary disconnect rather than a failure
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ReadError::Closed(_) | ReadError::StreamEnded)
    }
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, StatusCode> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.origin_allowed(origin) {
        tracing::warn!(origin = ?origin, "Rejected WebSocket upgrade from disallowed origin");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(ws
        .on_failed_upgrade(|error: axum::Error| {
            tracing::warn!(error = %error, "WebSocket upgrade failed");
        })
        .on_upgrade(move |socket| handle_socket(socket, state)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionIdFactory::generate();
    let (sender, receiver) = socket.split();

    let connect_usecase = ConnectClientUseCase::new(
        state.registry.clone(),
        state.log.clone(),
        state.history_limit,
    );
    if let Err(e) = connect_usecase
        .execute(connection_id, Box::new(WebSocketSink::new(sender)))
        .await
    {
        tracing::warn!(connection_id = %connection_id, error = %e, "Client lost during connect");
        return;
    }

    let reason = read_inbound(receiver, connection_id, &state.submitter).await;
    if reason.is_disconnect() {
        tracing::info!(connection_id = %connection_id, reason = %reason, "Inbound reader stopped");
    } else {
        tracing::warn!(connection_id = %connection_id, error = %reason, "Inbound reader failed");
    }

    let disconnect_usecase = DisconnectClientUseCase::new(state.registry.clone());
    disconnect_usecase.execute(&connection_id).await;
}

/// Read frames until a terminal condition and submit each decoded message.
///
/// Returns the terminal condition. The caller removes the connection afterwards.
pub async fn read_inbound<S>(
    mut stream: S,
    connection_id: ConnectionId,
    submitter: &SubmitMessageUseCase,
) -> ReadError
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let frame = match stream.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(e)) => return ReadError::Transport(e.to_string()),
            None => return ReadError::StreamEnded,
        };

        let message = match decode_frame(frame) {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(e) => return e,
        };

        tracing::debug!(
            connection_id = %connection_id,
            username = message.username(),
            "Received message"
        );

        if submitter.execute(message).await.is_err() {
            return ReadError::DispatchClosed;
        }
    }
}

/// Decode one frame. Control frames yield `Ok(None)`.
fn decode_frame(frame: Message) -> Result<Option<ChatMessage>, ReadError> {
    let decoded = match frame {
        Message::Text(text) => ChatMessageDto::decode(text.as_str().as_bytes()),
        Message::Binary(data) => ChatMessageDto::decode(&data),
        Message::Ping(_) | Message::Pong(_) => return Ok(None),
        Message::Close(frame) => return Err(ReadError::Closed(frame.map(|f| f.code))),
    };

    decoded
        .map(|dto| Some(dto.into()))
        .map_err(|e| ReadError::Decode(e.to_string()))
}
