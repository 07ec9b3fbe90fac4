//! WebSocket message DTOs for the chat relay.
//!
//! The same JSON shape is used on the wire in both directions and as the record
//! format of the message log: `{"username":"alice","text":"hi"}`.

use serde::{Deserialize, Serialize};

use crate::domain::ChatMessage;

/// Chat message as sent and received over the WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub text: String,
}

impl ChatMessageDto {
    /// Decode a JSON payload.
    ///
    /// Unknown fields are ignored and a missing field decodes as an empty string.
    /// Non-JSON payloads and fields of the wrong type are errors.
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encode as a single-line JSON payload
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ChatMessageDto> for ChatMessage {
    fn from(dto: ChatMessageDto) -> Self {
        ChatMessage::new(dto.username, dto.text)
    }
}

impl From<&ChatMessage> for ChatMessageDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            username: message.username().to_string(),
            text: message.text().to_string(),
        }
    }
}
