//! In-memory broadcast port for single-node deployments.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use parley_core::result::AppResult;

use crate::channel::registry::ChannelRegistry;
use crate::connection::handle::{ConnectionId, Delivery};
use crate::connection::pool::ConnectionPool;
use crate::message::types::BroadcastEvent;
use crate::message::validator::validate_topic_name;
use crate::metrics::RealtimeMetrics;

use super::{BroadcastPort, TopicEvent};

/// Delivers published events straight into subscriber inboxes.
#[derive(Debug)]
pub struct MemoryBroadcast {
    /// Topic → subscribers.
    channels: Arc<ChannelRegistry>,
    /// Connection ID → handle.
    pool: Arc<ConnectionPool>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
}

impl MemoryBroadcast {
    /// Create a broadcast port over a registry and connection pool
    pub fn new(
        channels: Arc<ChannelRegistry>,
        pool: Arc<ConnectionPool>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            channels,
            pool,
            metrics,
        }
    }
}

#[async_trait]
impl BroadcastPort for MemoryBroadcast {
    async fn subscribe(&self, topic: &str, conn_id: ConnectionId) -> AppResult<()> {
        validate_topic_name(topic)?;
        self.channels.subscribe(topic.to_string(), conn_id);
        debug!(conn_id = %conn_id, topic = %topic, "Subscribed to topic");
        Ok(())
    }

    async fn unsubscribe(&self, topic: &str, conn_id: ConnectionId) -> AppResult<()> {
        self.channels.unsubscribe(topic, conn_id);
        debug!(conn_id = %conn_id, topic = %topic, "Unsubscribed from topic");
        Ok(())
    }

    async fn publish(&self, topic: &str, event: BroadcastEvent) -> AppResult<usize> {
        validate_topic_name(topic)?;

        let event = Arc::new(event);
        let mut delivered = 0;
        for conn_id in self.channels.get_subscribers(topic) {
            let Some(handle) = self.pool.get(&conn_id) else {
                continue;
            };
            let delivery = handle.deliver(TopicEvent {
                topic: topic.to_string(),
                event: event.clone(),
            });
            match delivery {
                Delivery::Sent => delivered += 1,
                Delivery::Dropped => self.metrics.delivery_dropped(),
                Delivery::Closed => {}
            }
        }

        debug!(topic = %topic, delivered, "Published to topic");
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::handle::{ConnectionHandle, ConnectionKind};
    use crate::message::builder::build_chat_updated;
    use parley_core::types::id::ChatId;
    use tokio::sync::mpsc;

    fn port() -> (MemoryBroadcast, Arc<ConnectionPool>) {
        let pool = Arc::new(ConnectionPool::new());
        let port = MemoryBroadcast::new(
            Arc::new(ChannelRegistry::new()),
            pool.clone(),
            Arc::new(RealtimeMetrics::new()),
        );
        (port, pool)
    }

    fn connect(pool: &ConnectionPool) -> (ConnectionId, mpsc::Receiver<TopicEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = Arc::new(ConnectionHandle::new(ConnectionKind::List, tx));
        let id = handle.id;
        pool.add(handle);
        (id, rx)
    }

    #[tokio::test]
    async fn test_publish_reaches_only_subscribers() {
        let (port, pool) = port();
        let (a, mut rx_a) = connect(&pool);
        let (_b, mut rx_b) = connect(&pool);
        port.subscribe("user.a.chats", a).await.unwrap();

        let chat_id = ChatId::new();
        let n = port
            .publish("user.a.chats", build_chat_updated(chat_id))
            .await
            .unwrap();
        assert_eq!(n, 1);

        let got = rx_a.recv().await.unwrap();
        assert_eq!(got.topic, "user.a.chats");
        assert_eq!(*got.event, build_chat_updated(chat_id));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let (port, pool) = port();
        let (a, mut rx) = connect(&pool);
        port.subscribe("chat.c", a).await.unwrap();
        port.unsubscribe("chat.c", a).await.unwrap();

        let n = port
            .publish("chat.c", build_chat_updated(ChatId::new()))
            .await
            .unwrap();
        assert_eq!(n, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_invalid_topic_is_rejected() {
        let (port, _) = port();
        let err = port
            .publish("no spaces", build_chat_updated(ChatId::new()))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}
