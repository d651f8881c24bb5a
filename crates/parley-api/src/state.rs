//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use parley_auth::{JwtEncoder, JwtIdentityResolver};
use parley_core::config::AppConfig;
use parley_core::traits::identity::IdentityResolver;
use parley_database::MemoryDatabase;
use parley_database::repositories::{ChatRepository, UserRepository};
use parley_realtime::RealtimeEngine;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// In-memory user/chat/message store
    pub db: Arc<MemoryDatabase>,
    /// Access token issuer (dev tooling and tests)
    pub jwt_encoder: Arc<JwtEncoder>,
    /// Real-time engine
    pub realtime: RealtimeEngine,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire the identity resolver, the store and the real-time engine.
    pub fn new(config: AppConfig, db: Arc<MemoryDatabase>) -> Self {
        let users: Arc<dyn UserRepository> = db.clone();
        let chats: Arc<dyn ChatRepository> = db.clone();
        let identity: Arc<dyn IdentityResolver> =
            Arc::new(JwtIdentityResolver::new(&config.auth, users.clone()));

        let realtime = RealtimeEngine::new(config.realtime.clone(), identity, users, chats);
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));

        Self {
            config: Arc::new(config),
            db,
            jwt_encoder,
            realtime,
            started_at: Instant::now(),
        }
    }
}
