//! Collaborators shared by every connection.

use std::sync::Arc;

use parley_core::traits::identity::{Credentials, IdentityResolver};
use parley_core::types::id::UserId;
use parley_database::repositories::ChatRepository;

use crate::bridge::BroadcastPort;
use crate::fanout::FanoutEngine;
use crate::metrics::RealtimeMetrics;
use crate::session::SessionStore;

use super::close::CloseReason;

/// Everything a connection state machine talks to.
#[derive(Clone)]
pub struct ConnectionContext {
    /// Credentials → user or anonymous.
    pub identity: Arc<dyn IdentityResolver>,
    /// Presence and chat sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// Chat and message store.
    pub chats: Arc<dyn ChatRepository>,
    /// Topic pub/sub.
    pub broadcast: Arc<dyn BroadcastPort>,
    /// Per-message fan-out.
    pub fanout: Arc<FanoutEngine>,
    /// Metrics.
    pub metrics: Arc<RealtimeMetrics>,
    /// Maximum inbound frame size in bytes.
    pub max_message_bytes: usize,
}

impl std::fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("max_message_bytes", &self.max_message_bytes)
            .finish()
    }
}

impl ConnectionContext {
    /// Resolve credentials to a user, or fail with [`CloseReason::AuthMissing`].
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<UserId, CloseReason> {
        self.identity
            .resolve(credentials)
            .await
            .user_id()
            .ok_or(CloseReason::AuthMissing)
    }
}
