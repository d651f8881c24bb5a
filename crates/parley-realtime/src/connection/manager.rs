//! Registers connections and cleans up after them.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::bridge::TopicEvent;
use crate::channel::registry::ChannelRegistry;
use crate::metrics::RealtimeMetrics;

use super::handle::{ConnectionHandle, ConnectionId, ConnectionKind};
use super::pool::ConnectionPool;

/// Tracks every live connection's inbox.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Connection pool.
    pool: Arc<ConnectionPool>,
    /// Channel registry.
    channels: Arc<ChannelRegistry>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Inbox capacity per connection.
    buffer_size: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        pool: Arc<ConnectionPool>,
        channels: Arc<ChannelRegistry>,
        metrics: Arc<RealtimeMetrics>,
        buffer_size: usize,
    ) -> Self {
        Self {
            pool,
            channels,
            metrics,
            buffer_size,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns the connection handle and the receiver for its topic inbox.
    pub fn register(
        &self,
        kind: ConnectionKind,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<TopicEvent>) {
        let (tx, rx) = mpsc::channel(self.buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(kind, tx));

        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        debug!(conn_id = %handle.id, kind = %kind, "Connection registered");
        (handle, rx)
    }

    /// Unregisters a connection and drops any subscriptions it still holds.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_closed();

            let leaked = self.channels.unsubscribe_all(*conn_id);
            if leaked > 0 {
                debug!(conn_id = %conn_id, leaked, "Dropped leftover subscriptions");
            }

            self.metrics.connection_closed();
            debug!(conn_id = %conn_id, kind = %handle.kind, "Connection unregistered");
        }
    }

    /// Marks every connection closed and unregisters it.
    pub fn close_all(&self) {
        let all = self.pool.all_connections();
        for conn in &all {
            self.unregister(&conn.id);
        }
        info!(count = all.len(), "All connections closed");
    }

    /// Returns the total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Returns the number of registered connections of one kind.
    pub fn count_of(&self, kind: ConnectionKind) -> usize {
        self.pool.count_of(kind)
    }
}
