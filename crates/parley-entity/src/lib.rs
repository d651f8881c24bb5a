//! # parley-entity
//!
//! Domain entity models for Parley. Every struct in this crate represents
//! a stored record or a domain value object exchanged with clients. All
//! entities derive `Debug`, `Clone`, `Serialize` and `Deserialize`.

pub mod chat;
pub mod message;
pub mod session;
pub mod user;
