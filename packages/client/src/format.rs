//! Conversion between typed lines, wire payloads and terminal output.

use parley_server::infrastructure::dto::websocket::ChatMessageDto;
use parley_shared::time::local_clock;

/// Encode a typed line as a wire payload
pub fn encode_outgoing(username: &str, text: &str) -> Result<String, serde_json::Error> {
    ChatMessageDto {
        username: username.to_string(),
        text: text.to_string(),
    }
    .encode()
}

/// Render a received payload for the terminal, stamped with `clock`.
///
/// Payloads that are not chat messages are shown verbatim.
pub fn render_incoming(payload: &str, clock: &str) -> String {
    match ChatMessageDto::decode(payload.as_bytes()) {
        Ok(message) => format!("[{clock}] <{}> {}", message.username, message.text),
        Err(_) => format!("[{clock}] {payload}"),
    }
}

/// Render a received payload with the current local time
pub fn format_incoming(payload: &str) -> String {
    render_incoming(payload, &local_clock())
}
