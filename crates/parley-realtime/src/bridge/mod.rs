//! Group broadcast port: publish to a topic, subscribe connections to it.

pub mod memory_pubsub;

use std::sync::Arc;

use async_trait::async_trait;

use parley_core::result::AppResult;

use crate::connection::handle::ConnectionId;
use crate::message::types::BroadcastEvent;

pub use memory_pubsub::MemoryBroadcast;

/// An event as delivered to one subscribed connection.
#[derive(Debug, Clone)]
pub struct TopicEvent {
    /// Topic the event was published on.
    pub topic: String,
    /// Shared event payload.
    pub event: Arc<BroadcastEvent>,
}

/// Topic-addressed pub/sub facility.
///
/// Topics are opaque strings to the port; the engine owns the naming
/// scheme (see [`crate::channel::Topic`]).
#[async_trait]
pub trait BroadcastPort: Send + Sync + 'static {
    /// Add a connection to a topic's subscribers.
    async fn subscribe(&self, topic: &str, conn_id: ConnectionId) -> AppResult<()>;

    /// Remove a connection from a topic's subscribers.
    async fn unsubscribe(&self, topic: &str, conn_id: ConnectionId) -> AppResult<()>;

    /// Publish an event; returns how many connections it was queued for.
    async fn publish(&self, topic: &str, event: BroadcastEvent) -> AppResult<usize>;
}
