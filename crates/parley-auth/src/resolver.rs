//! JWT-backed identity resolution for inbound real-time connections.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use parley_core::config::AuthConfig;
use parley_core::error::AppError;
use parley_core::traits::identity::{Credentials, Identity, IdentityResolver};
use parley_core::types::id::UserId;
use parley_database::repositories::UserRepository;

use crate::jwt::JwtDecoder;

/// Resolves bearer tokens to active users.
///
/// Resolution is bounded by `identity_timeout_ms` and fails closed: a
/// missing, malformed or expired token, an unknown or disabled user, a
/// store error or a timeout all yield [`Identity::Anonymous`].
pub struct JwtIdentityResolver {
    decoder: JwtDecoder,
    users: Arc<dyn UserRepository>,
    timeout: Duration,
}

impl std::fmt::Debug for JwtIdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityResolver")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl JwtIdentityResolver {
    /// Creates a resolver from auth configuration and a user store.
    pub fn new(config: &AuthConfig, users: Arc<dyn UserRepository>) -> Self {
        Self {
            decoder: JwtDecoder::new(config),
            users,
            timeout: Duration::from_millis(config.identity_timeout_ms),
        }
    }

    async fn lookup(&self, token: &str) -> Result<UserId, AppError> {
        let claims = self.decoder.decode_access_token(token)?;
        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("Token subject does not exist"))?;
        if !user.is_active {
            return Err(AppError::authentication("Account is disabled"));
        }
        Ok(user.id)
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, credentials: &Credentials) -> Identity {
        let Some(token) = credentials.bearer_token() else {
            return Identity::Anonymous;
        };

        match tokio::time::timeout(self.timeout, self.lookup(token)).await {
            Ok(Ok(user_id)) => Identity::User(user_id),
            Ok(Err(e)) => {
                debug!(error = %e, "Identity resolution failed");
                Identity::Anonymous
            }
            Err(_) => {
                debug!(timeout_ms = self.timeout.as_millis() as u64, "Identity resolution timed out");
                Identity::Anonymous
            }
        }
    }
}
