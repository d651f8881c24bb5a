//! Route definitions for the Parley HTTP surface.

use axum::Router;
use axum::routing::get;

use crate::handlers;
use crate::state::AppState;

/// Build the router with every route, threading `AppState` through
/// `.with_state(state)`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route("/health", get(handlers::health::health));

    let ws_routes = Router::new()
        .route("/ws/chat/list/", get(handlers::ws::chat_list))
        .route("/ws/chat/{chat_id}/", get(handlers::ws::chat_room))
        .route(
            "/ws/notification/list/",
            get(handlers::ws::notification_list),
        );

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .fallback(handlers::not_found)
        .with_state(state)
}
