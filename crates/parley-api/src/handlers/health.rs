//! Health check handler.

use axum::Json;
use axum::extract::State;

use parley_realtime::connection::ConnectionKind;

use crate::dto::response::{ApiResponse, ConnectionCounts, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let connections = &state.realtime.connections;

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        connections: ConnectionCounts {
            total: connections.connection_count(),
            list: connections.count_of(ConnectionKind::List),
            chat: connections.count_of(ConnectionKind::Chat),
            notification: connections.count_of(ConnectionKind::Notification),
        },
        metrics: state.realtime.metrics.snapshot(),
    }))
}
