//! Subscribe-on-open / unsubscribe-on-close helper.

use std::sync::Arc;

use tracing::warn;

use parley_core::result::AppResult;

use crate::bridge::BroadcastPort;
use crate::channel::Topic;

use super::handle::ConnectionId;

/// Remembers which topics one connection joined so they can all be left.
pub struct TopicLink {
    conn_id: ConnectionId,
    broadcast: Arc<dyn BroadcastPort>,
    topics: Vec<String>,
}

impl TopicLink {
    /// Create an empty link for `conn_id`.
    pub fn new(conn_id: ConnectionId, broadcast: Arc<dyn BroadcastPort>) -> Self {
        Self {
            conn_id,
            broadcast,
            topics: Vec::new(),
        }
    }

    /// Subscribe to `topic`.
    pub async fn join(&mut self, topic: Topic) -> AppResult<()> {
        let name = topic.to_topic_string();
        self.broadcast.subscribe(&name, self.conn_id).await?;
        self.topics.push(name);
        Ok(())
    }

    /// Unsubscribe from every joined topic. Failures are logged.
    pub async fn leave_all(&mut self) {
        for topic in self.topics.drain(..) {
            if let Err(e) = self.broadcast.unsubscribe(&topic, self.conn_id).await {
                warn!(conn_id = %self.conn_id, topic = %topic, error = %e, "Unsubscribe failed");
            }
        }
    }
}
