//! Topic events, client-facing frames, and their validation/serialization.

pub mod builder;
pub mod serializer;
pub mod types;
pub mod validator;

pub use types::{BroadcastEvent, NotificationPayload, OutboundMessage};
