//! Chat domain entities.

pub mod model;
pub mod summary;

pub use model::{Chat, ChatKind};
pub use summary::ChatSummary;
