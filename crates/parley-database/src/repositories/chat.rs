//! Chat and message repository port.

use async_trait::async_trait;

use parley_core::result::AppResult;
use parley_core::types::id::{ChatId, UserId};
use parley_entity::chat::{Chat, ChatSummary};
use parley_entity::message::{Message, NewMessage};

/// Access to chats and their messages.
#[async_trait]
pub trait ChatRepository: Send + Sync + 'static {
    /// Find a chat by ID.
    async fn get_chat(&self, id: ChatId) -> AppResult<Option<Chat>>;

    /// Whether `user_id` is a member of `chat_id`. Unknown chats yield false.
    async fn is_member(&self, chat_id: ChatId, user_id: UserId) -> AppResult<bool>;

    /// Validate and persist a new message.
    ///
    /// Fails with a validation error when the payload violates the
    /// message schema, and with not-found when the chat does not exist.
    async fn create_message(
        &self,
        chat_id: ChatId,
        author: UserId,
        payload: NewMessage,
    ) -> AppResult<Message>;

    /// The chat as seen by `viewer`: other members plus the newest message.
    async fn chat_summary(&self, chat_id: ChatId, viewer: UserId)
    -> AppResult<Option<ChatSummary>>;

    /// Insert or replace a chat.
    async fn insert_chat(&self, chat: Chat) -> AppResult<Chat>;

    /// All messages of a chat, oldest first.
    async fn list_messages(&self, chat_id: ChatId) -> AppResult<Vec<Message>>;
}
