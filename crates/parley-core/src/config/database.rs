//! In-memory store configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-memory user/chat/message store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Optional JSON file with users and chats to seed at startup.
    #[serde(default)]
    pub fixtures_path: Option<String>,
}
