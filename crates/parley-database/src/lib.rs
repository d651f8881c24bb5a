//! # parley-database
//!
//! Storage ports consumed by the real-time engine and an in-memory
//! implementation backed by `DashMap`. Durable storage is out of scope for
//! Parley; anything that implements [`UserRepository`] and
//! [`ChatRepository`] can be plugged in.

pub mod memory;
pub mod repositories;

pub use memory::MemoryDatabase;
pub use repositories::{ChatRepository, UserRepository};
