//! Presence and chat session records.

pub mod model;

pub use model::{ChatSession, PresenceSession, SessionState};
