//! Connection lifecycle states.

use serde::{Deserialize, Serialize};

/// `DISCONNECTED → CONNECTING → OPEN → CLOSED`. `CLOSED` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    /// Not yet started.
    Disconnected,
    /// Handshake in progress.
    Connecting,
    /// Identity, sessions and subscriptions established.
    Open,
    /// Torn down.
    Closed,
}

/// Tracks one connection's state and guards its transitions.
#[derive(Debug)]
pub struct Lifecycle {
    state: ConnectionState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
        }
    }
}

impl Lifecycle {
    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `DISCONNECTED → CONNECTING`. Returns false from any other state.
    pub fn begin(&mut self) -> bool {
        self.advance(ConnectionState::Disconnected, ConnectionState::Connecting)
    }

    /// `CONNECTING → OPEN`. Returns false from any other state.
    pub fn open(&mut self) -> bool {
        self.advance(ConnectionState::Connecting, ConnectionState::Open)
    }

    /// Move to `CLOSED`. Returns true only on the first call.
    pub fn close(&mut self) -> bool {
        if self.state == ConnectionState::Closed {
            return false;
        }
        self.state = ConnectionState::Closed;
        true
    }

    /// Whether inbound events may be processed.
    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    fn advance(&mut self, from: ConnectionState, to: ConnectionState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        true
    }
}
