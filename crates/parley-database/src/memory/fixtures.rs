//! JSON fixtures for seeding the in-memory store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_entity::chat::Chat;
use parley_entity::user::User;

use super::store::MemoryDatabase;
use crate::repositories::{ChatRepository, UserRepository};

/// Users and chats to preload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    /// Users to insert.
    #[serde(default)]
    pub users: Vec<User>,
    /// Chats to insert.
    #[serde(default)]
    pub chats: Vec<Chat>,
}

impl Fixtures {
    /// Read fixtures from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::configuration(format!(
                "Failed to read fixtures '{}': {e}",
                path.display()
            ))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Insert every user and chat into the store.
    ///
    /// Chats naming members that are not among the known users are rejected.
    pub async fn apply(self, db: &MemoryDatabase) -> AppResult<()> {
        for user in self.users {
            db.insert_user(user).await?;
        }
        for chat in self.chats {
            for member in &chat.members {
                if db.find_by_id(*member).await?.is_none() {
                    return Err(AppError::validation(format!(
                        "Chat {} references unknown user {member}",
                        chat.id
                    )));
                }
            }
            db.insert_chat(chat).await?;
        }
        info!(
            users = db.user_count(),
            chats = db.chat_count(),
            "Fixtures applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::id::UserId;
    use parley_entity::chat::ChatKind;

    #[tokio::test]
    async fn test_apply_fixtures() {
        let alice = User::new("alice", "a@example.com");
        let bob = User::new("bob", "b@example.com");
        let chat = Chat::new(ChatKind::Conversation, [alice.id, bob.id]);
        let raw = serde_json::to_string(&Fixtures {
            users: vec![alice, bob],
            chats: vec![chat.clone()],
        })
        .unwrap();

        let fixtures: Fixtures = serde_json::from_str(&raw).unwrap();
        let db = MemoryDatabase::new();
        fixtures.apply(&db).await.unwrap();
        assert_eq!(db.user_count(), 2);
        assert!(db.get_chat(chat.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_rejects_dangling_member() {
        let chat = Chat::new(ChatKind::Room, [UserId::new()]);
        let fixtures = Fixtures {
            users: vec![],
            chats: vec![chat],
        };
        let db = MemoryDatabase::new();
        assert!(fixtures.apply(&db).await.is_err());
    }
}
