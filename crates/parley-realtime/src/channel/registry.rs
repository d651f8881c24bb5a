//! Topic to subscriber index, with a reverse index per connection.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

use super::subscription::SubscriptionTracker;

/// Registry of all topics that currently have subscribers.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Topic name → subscribed connections. Never holds an empty set.
    channels: DashMap<String, HashSet<ConnectionId>>,
    /// Subscription tracker (reverse index).
    subscriptions: SubscriptionTracker,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes a connection to a topic.
    pub fn subscribe(&self, topic: String, conn_id: ConnectionId) {
        self.channels
            .entry(topic.clone())
            .or_default()
            .insert(conn_id);

        self.subscriptions.add(conn_id, topic);
    }

    /// Unsubscribes a connection from a topic.
    pub fn unsubscribe(&self, topic: &str, conn_id: ConnectionId) {
        self.detach(topic, conn_id);
        self.subscriptions.remove(conn_id, topic);
    }

    /// Unsubscribes a connection from all topics.
    pub fn unsubscribe_all(&self, conn_id: ConnectionId) -> usize {
        let topics = self.subscriptions.remove_all(conn_id);
        for topic in &topics {
            self.detach(topic, conn_id);
        }
        topics.len()
    }

    fn detach(&self, topic: &str, conn_id: ConnectionId) {
        let emptied = match self.channels.get_mut(topic) {
            Some(mut subscribers) => {
                subscribers.remove(&conn_id);
                subscribers.is_empty()
            }
            None => false,
        };
        if emptied {
            self.channels.remove_if(topic, |_, subscribers| subscribers.is_empty());
        }
    }

    /// Returns all subscriber connection IDs for a topic.
    pub fn get_subscribers(&self, topic: &str) -> Vec<ConnectionId> {
        self.channels
            .get(topic)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Returns the subscription count for a connection.
    pub fn subscription_count(&self, conn_id: ConnectionId) -> usize {
        self.subscriptions.count(conn_id)
    }

    /// Returns subscriber count for a topic.
    pub fn channel_subscriber_count(&self, topic: &str) -> usize {
        self.channels
            .get(topic)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Returns total number of topics with at least one subscriber.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
