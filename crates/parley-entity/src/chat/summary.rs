//! Chat summary as seen by one particular member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::id::ChatId;

use super::model::ChatKind;
use crate::message::MessageView;
use crate::user::UserSummary;

/// A chat projected from the perspective of one member: the `users` list
/// holds every *other* member, and `latest_message` is the newest message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Chat identifier.
    pub id: ChatId,
    /// Conversation or room.
    #[serde(rename = "type")]
    pub kind: ChatKind,
    /// Other members of the chat.
    pub users: Vec<UserSummary>,
    /// When the chat was created.
    pub created_at: DateTime<Utc>,
    /// Last time a message was added.
    pub updated_at: DateTime<Utc>,
    /// Optional display title.
    pub title: Option<String>,
    /// Newest message, if any.
    pub latest_message: Option<MessageView>,
}
