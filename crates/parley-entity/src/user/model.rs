//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::id::UserId;

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display handle, unique across the system.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Disabled accounts cannot open real-time connections.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// When the account was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// Create a new active user.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// The public projection shown to other chat members.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Public view of a user embedded in chat summaries and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier.
    pub id: UserId,
    /// Display handle.
    pub username: String,
}
