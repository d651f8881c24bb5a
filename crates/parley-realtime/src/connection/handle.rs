//! Individual connection handle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::bridge::TopicEvent;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// Which state machine drives a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Global chat-list view.
    List,
    /// One chat's live room.
    Chat,
    /// Global notification channel.
    Notification,
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => write!(f, "list"),
            Self::Chat => write!(f, "chat"),
            Self::Notification => write!(f, "notification"),
        }
    }
}

/// Result of handing a topic event to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued in the connection's inbox.
    Sent,
    /// Inbox full; event dropped for this connection only.
    Dropped,
    /// Connection is gone.
    Closed,
}

/// A handle to a single registered connection.
///
/// Holds the sender half of the connection's topic inbox. The broadcast
/// port pushes into it; the connection driver drains it.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// State machine kind
    pub kind: ConnectionKind,
    /// Sender for topic deliveries
    sender: mpsc::Sender<TopicEvent>,
    /// When the connection was registered
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(kind: ConnectionKind, sender: mpsc::Sender<TopicEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a topic event without waiting
    pub fn deliver(&self, event: TopicEvent) -> Delivery {
        if !self.is_alive() {
            return Delivery::Closed;
        }
        match self.sender.try_send(event) {
            Ok(()) => Delivery::Sent,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    topic = %event.topic,
                    "Connection inbox full, dropping event"
                );
                Delivery::Dropped
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                Delivery::Closed
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
