//! Connection state machines and their plumbing.

pub mod chat;
pub mod close;
pub mod context;
pub mod driver;
pub mod handle;
pub mod heartbeat;
pub mod lifecycle;
pub mod link;
pub mod list;
pub mod manager;
pub mod notification;
pub mod pool;

use async_trait::async_trait;

use parley_core::traits::identity::Credentials;

use crate::bridge::TopicEvent;
use crate::message::types::OutboundMessage;

pub use chat::ChatConnection;
pub use close::CloseReason;
pub use context::ConnectionContext;
pub use handle::{ConnectionHandle, ConnectionId, ConnectionKind};
pub use lifecycle::ConnectionState;
pub use list::ListConnection;
pub use notification::NotificationConnection;

/// Capability shared by the list, chat and notification state machines.
///
/// The driver calls `connect` once, then feeds client frames to `receive`
/// and topic deliveries to `relay` strictly one at a time, and finally
/// calls `disconnect` exactly once regardless of how the connection ended.
#[async_trait]
pub trait Connection: Send {
    /// Connection id used for topic subscriptions.
    fn id(&self) -> ConnectionId;

    /// State machine kind.
    fn kind(&self) -> ConnectionKind;

    /// Current lifecycle state.
    fn state(&self) -> ConnectionState;

    /// Resolve identity, start sessions and subscribe. On error the
    /// connection must be closed with the returned reason.
    async fn connect(&mut self, credentials: &Credentials) -> Result<(), CloseReason>;

    /// Handle one inbound client frame.
    async fn receive(&mut self, raw: &str) -> Result<Option<OutboundMessage>, CloseReason>;

    /// Turn a topic delivery into an outbound frame, if any.
    async fn relay(&mut self, delivery: TopicEvent) -> Result<Option<OutboundMessage>, CloseReason>;

    /// Unsubscribe and end this connection's own sessions. Idempotent.
    async fn disconnect(&mut self);
}
