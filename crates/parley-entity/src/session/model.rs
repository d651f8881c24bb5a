//! Session entity models.
//!
//! A presence session records that a user is connected to the global
//! chat-list channel; a chat session records that a user is connected to
//! one chat's live channel. Both share the same ACTIVE/INACTIVE shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::id::{ChatId, SessionId, UserId};

/// Lifecycle state of a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// The owning connection is live.
    Active,
    /// Ended by disconnect or superseded by a newer session.
    Inactive,
}

/// One user's connection to the global chat-list channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSession {
    /// Session identifier.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Current state.
    pub state: SessionState,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended; `None` while active.
    pub ended_at: Option<DateTime<Utc>>,
}

impl PresenceSession {
    /// Start a new active session.
    pub fn start(user_id: UserId) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            state: SessionState::Active,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Whether the session is active.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// End the session. Returns false if it was already inactive, in
    /// which case `ended_at` is left untouched.
    pub fn end(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = SessionState::Inactive;
        self.ended_at = Some(at);
        true
    }
}

/// One user's connection to a specific chat's live channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Session identifier.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// Chat being tracked.
    pub chat_id: ChatId,
    /// Current state.
    pub state: SessionState,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended; `None` while active.
    pub ended_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Start a new active session.
    pub fn start(user_id: UserId, chat_id: ChatId) -> Self {
        Self {
            id: SessionId::new(),
            user_id,
            chat_id,
            state: SessionState::Active,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Whether the session is active.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// End the session. Returns false if it was already inactive.
    pub fn end(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = SessionState::Inactive;
        self.ended_at = Some(at);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_is_idempotent() {
        let mut session = PresenceSession::start(UserId::new());
        let first = Utc::now();
        assert!(session.end(first));
        assert_eq!(session.ended_at, Some(first));

        let later = first + chrono::Duration::seconds(5);
        assert!(!session.end(later));
        assert_eq!(session.ended_at, Some(first));
        assert_eq!(session.state, SessionState::Inactive);
    }

    #[test]
    fn test_chat_session_starts_active() {
        let session = ChatSession::start(UserId::new(), ChatId::new());
        assert!(session.is_active());
        assert!(session.ended_at.is_none());
    }
}
