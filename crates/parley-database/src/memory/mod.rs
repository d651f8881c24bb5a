//! In-memory store for single-node deployments and tests.

pub mod fixtures;
pub mod store;

pub use fixtures::Fixtures;
pub use store::MemoryDatabase;
