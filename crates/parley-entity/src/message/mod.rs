//! Message domain entities.

pub mod model;
pub mod new;

pub use model::{Message, MessageKind, MessageView};
pub use new::NewMessage;
