//! `DashMap`-backed session store.
//!
//! Every scope key lives under a single map entry (presence sessions per
//! user, chat sessions per user and then per chat), so end-then-create runs
//! while holding that entry's shard lock. Unrelated users never contend on
//! a global lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use parley_core::types::id::{ChatId, UserId};
use parley_database::repositories::UserRepository;
use parley_entity::session::{ChatSession, PresenceSession};

use super::error::SessionError;
use super::store::SessionStore;

/// In-memory session store with bounded history per scope.
pub struct MemorySessionStore {
    /// Used to reject chat sessions for unknown users.
    users: Arc<dyn UserRepository>,
    /// User → presence sessions, oldest first.
    presence: DashMap<UserId, Vec<PresenceSession>>,
    /// User → chat → chat sessions, oldest first.
    chats: DashMap<UserId, HashMap<ChatId, Vec<ChatSession>>>,
    /// User → open notification connections.
    notifications: DashMap<UserId, usize>,
    /// Ended sessions kept per scope.
    history: usize,
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("presence_users", &self.presence.len())
            .field("chat_users", &self.chats.len())
            .field("history", &self.history)
            .finish()
    }
}

impl MemorySessionStore {
    /// Create a store that keeps `history` ended sessions per scope.
    pub fn new(users: Arc<dyn UserRepository>, history: usize) -> Self {
        Self {
            users,
            presence: DashMap::new(),
            chats: DashMap::new(),
            notifications: DashMap::new(),
            history,
        }
    }

    /// Every presence session recorded for `user`, oldest first.
    pub fn presence_history(&self, user: UserId) -> Vec<PresenceSession> {
        self.presence
            .get(&user)
            .map(|s| s.value().clone())
            .unwrap_or_default()
    }

    /// Every chat session recorded for `(user, chat)`, oldest first.
    pub fn chat_history(&self, user: UserId, chat: ChatId) -> Vec<ChatSession> {
        self.chats
            .get(&user)
            .and_then(|by_chat| by_chat.get(&chat).cloned())
            .unwrap_or_default()
    }
}

/// Drop the oldest ended records beyond `keep`. Active records are never dropped.
fn prune<T>(records: &mut Vec<T>, keep: usize, is_active: impl Fn(&T) -> bool) {
    let ended = records.iter().filter(|r| !is_active(*r)).count();
    let mut excess = ended.saturating_sub(keep);
    if excess == 0 {
        return;
    }
    records.retain(|r| {
        if excess > 0 && !is_active(r) {
            excess -= 1;
            false
        } else {
            true
        }
    });
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn start_presence(&self, user: UserId) -> Result<PresenceSession, SessionError> {
        let now = Utc::now();
        let session = PresenceSession::start(user);

        let mut sessions = self.presence.entry(user).or_default();
        let superseded = sessions
            .iter_mut()
            .map(|s| s.end(now))
            .filter(|ended| *ended)
            .count();
        sessions.push(session.clone());
        prune(&mut *sessions, self.history, PresenceSession::is_active);
        drop(sessions);

        if superseded > 0 {
            info!(user_id = %user, superseded, "Superseded presence session");
        }
        debug!(user_id = %user, session_id = %session.id, "Presence session started");
        Ok(session)
    }

    async fn end_presence(&self, session: &PresenceSession) -> Result<bool, SessionError> {
        let Some(mut sessions) = self.presence.get_mut(&session.user_id) else {
            return Ok(false);
        };
        let ended = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .map(|s| s.end(Utc::now()))
            .unwrap_or(false);
        prune(&mut *sessions, self.history, PresenceSession::is_active);

        if ended {
            debug!(user_id = %session.user_id, session_id = %session.id, "Presence session ended");
        }
        Ok(ended)
    }

    async fn is_presence_active(&self, user: UserId) -> Result<bool, SessionError> {
        Ok(self
            .presence
            .get(&user)
            .map(|s| s.iter().any(PresenceSession::is_active))
            .unwrap_or(false))
    }

    async fn start_chat_session(
        &self,
        user: UserId,
        chat: ChatId,
    ) -> Result<ChatSession, SessionError> {
        if self.users.find_by_id(user).await?.is_none() {
            return Err(SessionError::UnknownUser(user));
        }

        let now = Utc::now();
        let session = ChatSession::start(user, chat);

        let mut by_chat = self.chats.entry(user).or_default();
        let sessions = by_chat.entry(chat).or_default();
        let superseded = sessions
            .iter_mut()
            .map(|s| s.end(now))
            .filter(|ended| *ended)
            .count();
        sessions.push(session.clone());
        prune(sessions, self.history, ChatSession::is_active);
        drop(by_chat);

        if superseded > 0 {
            info!(user_id = %user, chat_id = %chat, superseded, "Superseded chat session");
        }
        debug!(user_id = %user, chat_id = %chat, session_id = %session.id, "Chat session started");
        Ok(session)
    }

    async fn end_chat_session(&self, session: &ChatSession) -> Result<bool, SessionError> {
        let Some(mut by_chat) = self.chats.get_mut(&session.user_id) else {
            return Ok(false);
        };
        let Some(sessions) = by_chat.get_mut(&session.chat_id) else {
            return Ok(false);
        };
        let ended = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .map(|s| s.end(Utc::now()))
            .unwrap_or(false);
        prune(sessions, self.history, ChatSession::is_active);

        if ended {
            debug!(
                user_id = %session.user_id,
                chat_id = %session.chat_id,
                session_id = %session.id,
                "Chat session ended"
            );
        }
        Ok(ended)
    }

    async fn active_chat_sessions_for(
        &self,
        user: UserId,
    ) -> Result<HashSet<ChatId>, SessionError> {
        Ok(self
            .chats
            .get(&user)
            .map(|by_chat| {
                by_chat
                    .iter()
                    .filter(|(_, sessions)| sessions.iter().any(ChatSession::is_active))
                    .map(|(chat, _)| *chat)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn has_active_chat_session(
        &self,
        user: UserId,
        chat: ChatId,
    ) -> Result<bool, SessionError> {
        Ok(self
            .chats
            .get(&user)
            .and_then(|by_chat| {
                by_chat
                    .get(&chat)
                    .map(|sessions| sessions.iter().any(ChatSession::is_active))
            })
            .unwrap_or(false))
    }

    async fn set_notification_eligible(
        &self,
        user: UserId,
        eligible: bool,
    ) -> Result<(), SessionError> {
        if eligible {
            *self.notifications.entry(user).or_insert(0) += 1;
        } else {
            let emptied = match self.notifications.get_mut(&user) {
                Some(mut open) => {
                    *open = open.saturating_sub(1);
                    *open == 0
                }
                None => false,
            };
            if emptied {
                self.notifications.remove_if(&user, |_, open| *open == 0);
            }
        }
        debug!(user_id = %user, eligible, "Notification eligibility updated");
        Ok(())
    }

    async fn is_notification_eligible(&self, user: UserId) -> Result<bool, SessionError> {
        Ok(self
            .notifications
            .get(&user)
            .map(|open| *open > 0)
            .unwrap_or(false))
    }
}
