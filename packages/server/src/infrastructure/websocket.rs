//! WebSocket implementation of the connection sink.

use std::{error::Error as StdError, io};

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, stream::SplitSink};
use tokio_tungstenite::tungstenite::{self, error::ProtocolError};

use crate::domain::{ConnectionSink, DeliveryError};

/// Write half of an upgraded axum WebSocket
pub struct WebSocketSink {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketSink {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl ConnectionSink for WebSocketSink {
    async fn send_text(&mut self, payload: &str) -> Result<(), DeliveryError> {
        self.sink
            .send(Message::Text(payload.into()))
            .await
            .map_err(classify_send_error)
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}

/// Map an axum WebSocket send error onto the delivery error taxonomy.
fn classify_send_error(err: axum::Error) -> DeliveryError {
    let inner = err.into_inner();
    if let Some(ws_err) = inner.downcast_ref::<tungstenite::Error>() {
        return classify_tungstenite_error(ws_err);
    }
    if let Some(io_err) = find_io_error(&*inner) {
        return classify_io_error(io_err);
    }
    DeliveryError::Transport(inner.to_string())
}

pub(crate) fn classify_tungstenite_error(err: &tungstenite::Error) -> DeliveryError {
    match err {
        tungstenite::Error::ConnectionClosed => DeliveryError::GoingAway,
        tungstenite::Error::AlreadyClosed => DeliveryError::AlreadyClosed,
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            DeliveryError::StreamEnded
        }
        tungstenite::Error::Protocol(ProtocolError::SendAfterClosing) => DeliveryError::GoingAway,
        tungstenite::Error::Io(io_err) => classify_io_error(io_err),
        other => DeliveryError::Transport(other.to_string()),
    }
}

fn classify_io_error(err: &io::Error) -> DeliveryError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => DeliveryError::StreamEnded,
        _ => DeliveryError::Transport(err.to_string()),
    }
}

fn find_io_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        current = e.source();
    }
    None
}
