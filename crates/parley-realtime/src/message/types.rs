//! Event and frame type definitions.

use serde::{Deserialize, Serialize};

use parley_core::types::id::{ChatId, MessageId};
use parley_entity::chat::ChatSummary;
use parley_entity::message::MessageView;
use parley_entity::user::UserSummary;

/// Events published on topics by the fan-out engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum BroadcastEvent {
    /// Full message for everyone watching the chat's room topic.
    ChatMessage {
        /// The new message.
        message: MessageView,
    },
    /// List-refresh signal; receivers re-fetch the chat preview themselves.
    #[serde(rename_all = "camelCase")]
    ChatUpdated {
        /// Chat that changed.
        chat_id: ChatId,
    },
    /// Fully hydrated notification for members not watching the chat.
    NewMessage {
        /// Chat summary from the author's perspective.
        chat: ChatSummary,
        /// Author summary.
        user: UserSummary,
        /// The new message.
        message: MessageView,
    },
}

/// Body of a `NEW_MESSAGE` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Chat summary from the author's perspective.
    pub chat: ChatSummary,
    /// Author summary.
    pub user: UserSummary,
    /// The new message.
    pub message: MessageView,
}

/// Frames sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    /// A message relayed from the chat room.
    ChatMessage(MessageView),
    /// A refreshed chat preview for the list view.
    Chat(ChatSummary),
    /// A notification about a chat the user is not watching.
    NewMessage(NotificationPayload),
    /// The sender's message was stored and fanned out.
    MessageAck {
        /// Stored message id.
        message_id: MessageId,
    },
}
