//! WebSocket upgrade handlers.
//!
//! Each route registers one connection with the real-time engine and hands
//! the socket to [`RealtimeEngine::serve`](parley_realtime::RealtimeEngine::serve).
//! Authentication happens inside the connection state machine, after the
//! upgrade, so an unauthenticated client sees a close frame with a distinct
//! code instead of an HTTP error.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use parley_core::traits::identity::Credentials;
use parley_realtime::TopicEvent;
use parley_realtime::connection::Connection;
use parley_realtime::connection::driver::{ClientEvent, ServerFrame};

use crate::state::AppState;

/// Query parameters accepted by every WebSocket route.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// JWT access token, for clients that cannot set headers.
    pub token: Option<String>,
}

/// GET /ws/chat/list/
pub async fn chat_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let credentials = credentials(&headers, query);
    ws.on_upgrade(move |socket| async move {
        let (conn, inbox) = state.realtime.list_connection();
        run(state, conn, inbox, credentials, socket).await;
    })
}

/// GET /ws/chat/{chat_id}/
pub async fn chat_room(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let credentials = credentials(&headers, query);
    ws.on_upgrade(move |socket| async move {
        let (conn, inbox) = state.realtime.chat_connection(&chat_id);
        run(state, conn, inbox, credentials, socket).await;
    })
}

/// GET /ws/notification/list/
pub async fn notification_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let credentials = credentials(&headers, query);
    ws.on_upgrade(move |socket| async move {
        let (conn, inbox) = state.realtime.notification_connection();
        run(state, conn, inbox, credentials, socket).await;
    })
}

fn credentials(headers: &HeaderMap, query: WsQuery) -> Credentials {
    Credentials {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        query_token: query.token,
    }
}

/// Outbound frame queue capacity; a zero setting still gets one slot.
fn frame_buffer(configured: usize) -> usize {
    configured.max(1)
}

/// Bridges an established socket to the engine's driver.
async fn run<C: Connection>(
    state: AppState,
    conn: C,
    inbox: mpsc::Receiver<TopicEvent>,
    credentials: Credentials,
    socket: WebSocket,
) {
    let conn_id = conn.id();
    let kind = conn.kind();
    info!(conn_id = %conn_id, kind = %kind, "WebSocket connection established");

    let (mut ws_tx, ws_rx) = socket.split();
    let (frames_tx, mut frames_rx) =
        mpsc::channel::<ServerFrame>(frame_buffer(state.config.realtime.channel_buffer_size));

    let writer = tokio::spawn(async move {
        while let Some(frame) = frames_rx.recv().await {
            let (msg, last) = match frame {
                ServerFrame::Text(text) => (Message::Text(text.into()), false),
                ServerFrame::Ping => (Message::Ping(Default::default()), false),
                ServerFrame::Close(reason) => (
                    Message::Close(Some(CloseFrame {
                        code: reason.code(),
                        reason: reason.reason().into(),
                    })),
                    true,
                ),
            };
            if ws_tx.send(msg).await.is_err() || last {
                break;
            }
        }
    });

    let client = Box::pin(ws_rx.filter_map(|frame| async move {
        match frame {
            Ok(Message::Text(text)) => Some(ClientEvent::Text(text.as_str().to_owned())),
            Ok(Message::Pong(_)) => Some(ClientEvent::Pong),
            Ok(Message::Close(_)) => Some(ClientEvent::Closed),
            Ok(_) => None,
            Err(e) => {
                debug!(error = %e, "WebSocket read failed");
                Some(ClientEvent::Closed)
            }
        }
    }));

    let outcome = state
        .realtime
        .serve(conn, inbox, credentials, client, frames_tx)
        .await;
    let _ = writer.await;

    info!(conn_id = %conn_id, kind = %kind, outcome = ?outcome, "WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_never_zero() {
        assert_eq!(frame_buffer(0), 1);
        assert_eq!(frame_buffer(64), 64);
    }

    #[test]
    fn test_credentials_from_header_and_query() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        let creds = credentials(
            &headers,
            WsQuery {
                token: Some("xyz".to_string()),
            },
        );
        assert_eq!(creds.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(creds.query_token.as_deref(), Some("xyz"));
    }
}
