//! Per-message fan-out: who hears about a new message, and how.

pub mod classify;
pub mod engine;

pub use classify::{MemberPresence, Recipients, classify};
pub use engine::{FanoutEngine, FanoutReport};
