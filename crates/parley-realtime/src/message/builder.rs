//! Builder helpers for topic events and client frames.

use parley_core::types::id::{ChatId, MessageId};
use parley_entity::chat::ChatSummary;
use parley_entity::message::Message;
use parley_entity::user::UserSummary;

use super::types::{BroadcastEvent, NotificationPayload, OutboundMessage};

/// Build the room event carrying the full message.
pub fn build_room_message(message: &Message) -> BroadcastEvent {
    BroadcastEvent::ChatMessage {
        message: message.view(),
    }
}

/// Build a list-refresh signal.
pub fn build_chat_updated(chat_id: ChatId) -> BroadcastEvent {
    BroadcastEvent::ChatUpdated { chat_id }
}

/// Build a hydrated notification event.
pub fn build_new_message(chat: ChatSummary, author: UserSummary, message: &Message) -> BroadcastEvent {
    BroadcastEvent::NewMessage {
        chat,
        user: author,
        message: message.view(),
    }
}

/// Re-wrap a notification event as the client envelope.
pub fn build_notification(event: &BroadcastEvent) -> Option<OutboundMessage> {
    match event {
        BroadcastEvent::NewMessage {
            chat,
            user,
            message,
        } => Some(OutboundMessage::NewMessage(NotificationPayload {
            chat: chat.clone(),
            user: user.clone(),
            message: message.clone(),
        })),
        _ => None,
    }
}

/// Build the acknowledgement sent back to a message's author.
pub fn build_ack(message_id: MessageId) -> OutboundMessage {
    OutboundMessage::MessageAck { message_id }
}
