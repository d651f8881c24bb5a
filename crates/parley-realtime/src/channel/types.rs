//! Topic names derived from user and chat identifiers.
//!
//! Topics are never stored. Each one is a pure function of an id, so any
//! node can compute where to publish without a lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use parley_core::types::id::{ChatId, UserId};

/// Typed topic identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum Topic {
    /// A user's chat-list view: `user.<id>.chats`.
    UserChats(UserId),
    /// A user's notification channel: `user.<id>.notifications`.
    UserNotifications(UserId),
    /// A chat's live room: `chat.<id>`.
    ChatRoom(ChatId),
}

impl Topic {
    /// Parses a topic string into a typed topic.
    pub fn parse(topic: &str) -> Option<Self> {
        let parts: Vec<&str> = topic.split('.').collect();
        match parts.as_slice() {
            ["user", id, "chats"] => id.parse().ok().map(Topic::UserChats),
            ["user", id, "notifications"] => id.parse().ok().map(Topic::UserNotifications),
            ["chat", id] => id.parse().ok().map(Topic::ChatRoom),
            _ => None,
        }
    }

    /// Converts back to a topic string.
    pub fn to_topic_string(&self) -> String {
        match self {
            Topic::UserChats(id) => format!("user.{id}.chats"),
            Topic::UserNotifications(id) => format!("user.{id}.notifications"),
            Topic::ChatRoom(id) => format!("chat.{id}"),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_topic_string())
    }
}
