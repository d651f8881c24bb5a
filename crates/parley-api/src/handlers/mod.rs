//! Request handlers.

pub mod health;
pub mod ws;

use parley_core::error::AppError;

use crate::error::ApiError;

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    AppError::not_found("Route not found").into()
}
