//! Session store errors.

use thiserror::Error;

use parley_core::error::AppError;
use parley_core::types::id::UserId;

/// Failures surfaced by a [`SessionStore`](super::SessionStore).
#[derive(Debug, Error)]
pub enum SessionError {
    /// The user does not resolve to a known account.
    #[error("unknown user {0}")]
    UnknownUser(UserId),
    /// The backing store failed.
    #[error("session backend failure: {0}")]
    Backend(String),
}

impl From<AppError> for SessionError {
    fn from(err: AppError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match &err {
            SessionError::UnknownUser(_) => AppError::not_found(err.to_string()),
            SessionError::Backend(_) => AppError::session(err.to_string()),
        }
    }
}
