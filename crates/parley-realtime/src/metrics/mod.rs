//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections registered.
    pub connections_opened: AtomicU64,
    /// Connections unregistered.
    pub connections_closed: AtomicU64,
    /// Inbound client frames processed.
    pub messages_received: AtomicU64,
    /// Fan-out passes run.
    pub fanout_runs: AtomicU64,
    /// Topic publishes that succeeded.
    pub publishes_ok: AtomicU64,
    /// Topic publishes that failed.
    pub publishes_failed: AtomicU64,
    /// List-refresh signals published.
    pub list_refreshes: AtomicU64,
    /// Notifications published.
    pub notifications: AtomicU64,
    /// Deliveries dropped because a connection inbox was full.
    pub deliveries_dropped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection.
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a closed connection.
    pub fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an inbound client frame.
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a fan-out pass.
    pub fn fanout_run(&self) {
        self.fanout_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a publish.
    pub fn publish(&self, ok: bool) {
        if ok {
            self.publishes_ok.fetch_add(1, Ordering::Relaxed);
        } else {
            self.publishes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a list-refresh signal.
    pub fn list_refresh(&self) {
        self.list_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a notification.
    pub fn notification(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dropped delivery.
    pub fn delivery_dropped(&self) {
        self.deliveries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_closed: closed,
            connections_active: opened.saturating_sub(closed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            fanout_runs: self.fanout_runs.load(Ordering::Relaxed),
            publishes_ok: self.publishes_ok.load(Ordering::Relaxed),
            publishes_failed: self.publishes_failed.load(Ordering::Relaxed),
            list_refreshes: self.list_refreshes.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_opened: u64,
    /// Connections unregistered
    pub connections_closed: u64,
    /// Currently registered connections
    pub connections_active: u64,
    /// Inbound client frames processed
    pub messages_received: u64,
    /// Fan-out passes run
    pub fanout_runs: u64,
    /// Successful topic publishes
    pub publishes_ok: u64,
    /// Failed topic publishes
    pub publishes_failed: u64,
    /// List-refresh signals published
    pub list_refreshes: u64,
    /// Notifications published
    pub notifications: u64,
    /// Deliveries dropped on full inboxes
    pub deliveries_dropped: u64,
}
