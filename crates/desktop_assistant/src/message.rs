//! Chat message model shared with the streaming collaborator.

use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Seed instructions.
    System,
    /// Typed by the user.
    User,
    /// Produced by the model.
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier; streamed updates to one reply keep the same id.
    pub id: String,
    /// Author.
    pub role: ChatRole,
    /// Text content so far.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    pub fn new(id: impl Into<String>, role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
        }
    }

    /// Whether the message was produced by the model.
    pub fn is_assistant(&self) -> bool {
        self.role == ChatRole::Assistant
    }
}
