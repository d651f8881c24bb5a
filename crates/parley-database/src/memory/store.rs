//! `DashMap`-backed implementation of the repository ports.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use parley_core::error::AppError;
use parley_core::result::AppResult;
use parley_core::types::id::{ChatId, MessageId, UserId};
use parley_entity::chat::{Chat, ChatSummary};
use parley_entity::message::{Message, NewMessage};
use parley_entity::user::{User, UserSummary};

use crate::repositories::{ChatRepository, UserRepository};

/// Thread-safe in-memory store of users, chats and messages.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    /// User ID → user.
    users: DashMap<UserId, User>,
    /// Chat ID → chat.
    chats: DashMap<ChatId, Chat>,
    /// Chat ID → messages, oldest first.
    messages: DashMap<ChatId, Vec<Message>>,
}

impl MemoryDatabase {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of stored chats.
    pub fn chat_count(&self) -> usize {
        self.chats.len()
    }

    fn user_summaries(&self, chat: &Chat, viewer: &UserId) -> Vec<UserSummary> {
        let mut users: Vec<UserSummary> = chat
            .members_except(viewer)
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.summary()))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn insert_user(&self, user: User) -> AppResult<User> {
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ChatRepository for MemoryDatabase {
    async fn get_chat(&self, id: ChatId) -> AppResult<Option<Chat>> {
        Ok(self.chats.get(&id).map(|c| c.value().clone()))
    }

    async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool> {
        Ok(self
            .chats
            .get(&chat_id)
            .map(|c| c.has_member(&user_id))
            .unwrap_or(false))
    }

    async fn create_message(
        &self,
        chat_id: ChatId,
        author: UserId,
        payload: NewMessage,
    ) -> AppResult<Message> {
        payload.check()?;

        let now = Utc::now();
        {
            let mut chat = self
                .chats
                .get_mut(&chat_id)
                .ok_or_else(|| AppError::not_found(format!("Chat {chat_id} not found")))?;
            chat.updated_at = now;
        }

        let message = Message {
            id: MessageId::new(),
            chat_id,
            user_id: author,
            kind: payload.kind,
            content: payload.content,
            created_at: now,
            is_disabled: false,
        };

        self.messages
            .entry(chat_id)
            .or_default()
            .push(message.clone());

        debug!(chat_id = %chat_id, message_id = %message.id, "Message stored");
        Ok(message)
    }

    async fn chat_summary(
        &self,
        chat_id: ChatId,
        viewer: UserId,
    ) -> AppResult<Option<ChatSummary>> {
        let Some(chat) = self.chats.get(&chat_id).map(|c| c.value().clone()) else {
            return Ok(None);
        };

        let latest_message = self
            .messages
            .get(&chat_id)
            .and_then(|msgs| msgs.last().map(Message::view));

        Ok(Some(ChatSummary {
            id: chat.id,
            kind: chat.kind,
            users: self.user_summaries(&chat, &viewer),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            title: chat.title.clone(),
            latest_message,
        }))
    }

    async fn insert_chat(&self, chat: Chat) -> AppResult<Chat> {
        self.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn list_messages(&self, chat_id: ChatId) -> AppResult<Vec<Message>> {
        Ok(self
            .messages
            .get(&chat_id)
            .map(|m| m.value().clone())
            .unwrap_or_default())
    }
}
