//! Message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::id::{ChatId, MessageId, UserId};

/// Content kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageKind {
    /// Plain text.
    Text,
    /// Image reference.
    Image,
    /// Voice note reference.
    Voice,
    /// Audio file reference.
    Audio,
    /// Video reference.
    Videos,
    /// Document reference.
    Document,
    /// Generic attachment reference.
    Attachment,
}

/// A persisted chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Chat the message belongs to.
    pub chat_id: ChatId,
    /// Author.
    pub user_id: UserId,
    /// Content kind.
    pub kind: MessageKind,
    /// Text body or media reference.
    pub content: String,
    /// When the message was accepted.
    pub created_at: DateTime<Utc>,
    /// Set by moderation; never touched by fan-out.
    pub is_disabled: bool,
}

impl Message {
    /// The wire projection sent to clients.
    pub fn view(&self) -> MessageView {
        MessageView {
            id: self.id,
            chat_id: self.chat_id,
            user_id: self.user_id,
            kind: self.kind,
            content: self.content.clone(),
            created_at: self.created_at,
        }
    }
}

/// Client-facing representation of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    /// Message identifier.
    pub id: MessageId,
    /// Chat identifier.
    pub chat_id: ChatId,
    /// Author identifier.
    pub user_id: UserId,
    /// Content kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Text body or media reference.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
