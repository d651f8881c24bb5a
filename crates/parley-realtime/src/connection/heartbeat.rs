//! Ping/pong heartbeat bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

use parley_core::config::RealtimeConfig;

/// Heartbeat configuration
#[derive(Debug, Clone, Copy)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Grace after an unanswered ping before the connection is considered dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Tracks when the peer was last heard from.
#[derive(Debug)]
pub struct HeartbeatTracker {
    config: HeartbeatConfig,
    last_seen: Instant,
}

impl HeartbeatTracker {
    /// Start tracking from now.
    pub fn new(config: HeartbeatConfig) -> Self {
        Self {
            config,
            last_seen: Instant::now(),
        }
    }

    /// Record a pong or any other client activity.
    pub fn record(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Whether the peer has been silent longer than one ping interval
    /// plus the timeout.
    pub fn is_expired(&self) -> bool {
        self.last_seen.elapsed() > self.config.ping_interval + self.config.ping_timeout
    }
}
