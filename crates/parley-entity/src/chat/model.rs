//! Chat entity model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::id::{ChatId, UserId};

/// Kind of chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatKind {
    /// One-to-one conversation.
    Conversation,
    /// Multi-member room.
    Room,
}

/// A conversation between a set of member users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat identifier.
    pub id: ChatId,
    /// Conversation or room.
    #[serde(rename = "type")]
    pub kind: ChatKind,
    /// Optional display title (rooms usually have one).
    #[serde(default)]
    pub title: Option<String>,
    /// Member user ids; order carries no meaning.
    pub members: HashSet<UserId>,
    /// When the chat was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a message is added.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Create a chat with the given members.
    pub fn new(kind: ChatKind, members: impl IntoIterator<Item = UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: ChatId::new(),
            kind,
            title: None,
            members: members.into_iter().collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether the user belongs to this chat.
    pub fn has_member(&self, user_id: &UserId) -> bool {
        self.members.contains(user_id)
    }

    /// Members other than `user_id`.
    pub fn members_except(&self, user_id: &UserId) -> Vec<UserId> {
        self.members
            .iter()
            .filter(|m| *m != user_id)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_members_except_excludes_only_author() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let chat = Chat::new(ChatKind::Room, [a, b, c]);
        let mut others = chat.members_except(&a);
        others.sort();
        let mut expected = vec![b, c];
        expected.sort();
        assert_eq!(others, expected);
        assert!(chat.has_member(&a));
        assert!(!chat.has_member(&UserId::new()));
    }

    #[test]
    fn test_kind_wire_name() {
        let json = serde_json::to_string(&ChatKind::Conversation).unwrap();
        assert_eq!(json, "\"CONVERSATION\"");
    }
}
