//! Response DTOs.

use serde::{Deserialize, Serialize};

use parley_realtime::metrics::MetricsSnapshot;

/// Standard success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
    /// Open WebSocket connections, by kind.
    pub connections: ConnectionCounts,
    /// Real-time counters.
    pub metrics: MetricsSnapshot,
}

/// Registered connections per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCounts {
    pub total: usize,
    pub list: usize,
    pub chat: usize,
    pub notification: usize,
}
