//! Reverse index from connection to subscribed topics.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-topic subscription mappings (reverse index).
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    /// Connection ID → set of topic names.
    conn_to_topics: DashMap<ConnectionId, HashSet<String>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, conn_id: ConnectionId, topic: String) {
        self.conn_to_topics.entry(conn_id).or_default().insert(topic);
    }

    /// Removes a subscription.
    pub fn remove(&self, conn_id: ConnectionId, topic: &str) {
        let emptied = match self.conn_to_topics.get_mut(&conn_id) {
            Some(mut topics) => {
                topics.remove(topic);
                topics.is_empty()
            }
            None => false,
        };
        if emptied {
            self.conn_to_topics.remove_if(&conn_id, |_, topics| topics.is_empty());
        }
    }

    /// Returns the number of subscriptions for a connection.
    pub fn count(&self, conn_id: ConnectionId) -> usize {
        self.conn_to_topics
            .get(&conn_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Removes all subscriptions for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_topics
            .remove(&conn_id)
            .map(|(_, topics)| topics)
            .unwrap_or_default()
    }
}
