//! Presence, chat-session and notification-eligibility tracking.

pub mod error;
pub mod memory;
pub mod store;

pub use error::SessionError;
pub use memory::MemorySessionStore;
pub use store::SessionStore;
