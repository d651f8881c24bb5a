//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Token signing and identity resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Upper bound on a single identity resolution, in milliseconds.
    /// Resolutions that take longer resolve to anonymous.
    #[serde(default = "default_identity_timeout")]
    pub identity_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_access_ttl_minutes: default_access_ttl(),
            identity_timeout_ms: default_identity_timeout(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_identity_timeout() -> u64 {
    2000
}
