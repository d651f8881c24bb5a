//! # parley-api
//!
//! HTTP surface for Parley built on Axum.
//!
//! Exposes the three WebSocket endpoints served by the real-time engine,
//! a health endpoint, CORS and request tracing, and the mapping from
//! [`parley_core::AppError`] to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
