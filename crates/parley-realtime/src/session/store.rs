//! Session store port.

use std::collections::HashSet;

use async_trait::async_trait;

use parley_core::types::id::{ChatId, UserId};
use parley_entity::session::{ChatSession, PresenceSession};

use super::error::SessionError;

/// Authoritative presence state shared by every connection.
///
/// `start_*` operations end every ACTIVE session in the same scope before
/// creating the new one, atomically with respect to other calls for that
/// scope. `end_*` operations only touch the exact session passed in, so a
/// late disconnect can never end a newer connection's session.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// End all active presence sessions for `user`, then start a new one.
    async fn start_presence(&self, user: UserId) -> Result<PresenceSession, SessionError>;

    /// End this presence session. Returns false if it was already ended.
    async fn end_presence(&self, session: &PresenceSession) -> Result<bool, SessionError>;

    /// Whether `user` has an active presence session.
    async fn is_presence_active(&self, user: UserId) -> Result<bool, SessionError>;

    /// End all active sessions for `(user, chat)`, then start a new one.
    async fn start_chat_session(
        &self,
        user: UserId,
        chat: ChatId,
    ) -> Result<ChatSession, SessionError>;

    /// End this chat session. Returns false if it was already ended.
    async fn end_chat_session(&self, session: &ChatSession) -> Result<bool, SessionError>;

    /// Chats for which `user` holds an active chat session.
    async fn active_chat_sessions_for(&self, user: UserId)
    -> Result<HashSet<ChatId>, SessionError>;

    /// Whether `user` holds an active chat session on `chat`.
    async fn has_active_chat_session(
        &self,
        user: UserId,
        chat: ChatId,
    ) -> Result<bool, SessionError>;

    /// Mark a notification connection for `user` as opened (`true`) or
    /// closed (`false`).
    async fn set_notification_eligible(
        &self,
        user: UserId,
        eligible: bool,
    ) -> Result<(), SessionError>;

    /// Whether `user` has at least one open notification connection.
    async fn is_notification_eligible(&self, user: UserId) -> Result<bool, SessionError>;
}
