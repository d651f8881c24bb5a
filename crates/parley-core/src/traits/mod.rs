//! Ports defined in `parley-core` and implemented by other crates.

pub mod identity;

pub use identity::{Credentials, Identity, IdentityResolver};
