//! Identity resolution port.
//!
//! The real-time layer never inspects tokens itself; it hands the raw
//! credentials of an inbound connection to an [`IdentityResolver`] and
//! treats the answer as opaque.

use async_trait::async_trait;

use crate::types::id::UserId;

/// Raw credentials presented by an inbound connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Token passed as a query parameter, if any.
    pub query_token: Option<String>,
}

impl Credentials {
    /// Credentials carrying only an `Authorization` header value.
    pub fn from_header(value: impl Into<String>) -> Self {
        Self {
            authorization: Some(value.into()),
            query_token: None,
        }
    }

    /// Credentials carrying only a query-string token.
    pub fn from_query(token: impl Into<String>) -> Self {
        Self {
            authorization: None,
            query_token: Some(token.into()),
        }
    }

    /// Returns the bearer token, preferring the header over the query string.
    ///
    /// Header values must use the `Bearer <token>` scheme; anything else
    /// yields `None` even if a query token is present.
    pub fn bearer_token(&self) -> Option<&str> {
        if let Some(header) = &self.authorization {
            let mut parts = header.split_whitespace();
            return match (parts.next(), parts.next(), parts.next()) {
                (Some("Bearer"), Some(token), None) => Some(token),
                _ => None,
            };
        }
        self.query_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Outcome of resolving a connection's credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// A known, active user.
    User(UserId),
    /// No usable identity.
    Anonymous,
}

impl Identity {
    /// Returns the user id if this identity is a real user.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Identity::User(id) => Some(*id),
            Identity::Anonymous => None,
        }
    }

    /// Returns true for [`Identity::Anonymous`].
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}

/// Maps inbound connection credentials to a user or anonymous.
///
/// Implementations must bound their own latency and fail closed: any
/// error resolves to [`Identity::Anonymous`] rather than surfacing.
#[async_trait]
pub trait IdentityResolver: Send + Sync + 'static {
    /// Resolve credentials to an identity.
    async fn resolve(&self, credentials: &Credentials) -> Identity;
}
