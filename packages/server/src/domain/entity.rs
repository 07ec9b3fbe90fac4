//! Core domain models for the chat relay.

/// A chat message submitted by a client.
///
/// Messages carry no identity beyond their content: two messages with the same
/// username and text are indistinguishable. Once built a message is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    username: String,
    text: String,
}

impl ChatMessage {
    /// Create a new message
    pub fn new(username: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            text: text.into(),
        }
    }

    /// Display name of the sender
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Message body
    pub fn text(&self) -> &str {
        &self.text
    }
}
