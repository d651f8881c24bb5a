//! Shared test helpers for integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use parley_api::{AppState, build_app};
use parley_core::config::AppConfig;
use parley_database::MemoryDatabase;
use parley_database::repositories::{ChatRepository, UserRepository};
use parley_entity::chat::{Chat, ChatKind};
use parley_entity::user::User;
use parley_realtime::SessionStore;

/// A client socket.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// A server on an ephemeral port, seeded with three users and two chats.
///
/// `chat` has members alice and bob; `side_chat` has bob and carol.
pub struct TestApp {
    /// Bound address
    pub addr: SocketAddr,
    /// Router for in-process HTTP requests
    pub router: Router,
    /// Shared state, for inspecting sessions and metrics
    pub state: AppState,
    pub alice: User,
    pub bob: User,
    pub carol: User,
    pub chat: Chat,
    pub side_chat: Chat,
}

impl TestApp {
    /// Seed the store and start serving.
    pub async fn spawn() -> Self {
        let config = AppConfig::default();
        let db = Arc::new(MemoryDatabase::new());

        let alice = db
            .insert_user(User::new("alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = db
            .insert_user(User::new("bob", "bob@example.com"))
            .await
            .unwrap();
        let carol = db
            .insert_user(User::new("carol", "carol@example.com"))
            .await
            .unwrap();
        let chat = db
            .insert_chat(Chat::new(ChatKind::Conversation, [alice.id, bob.id]))
            .await
            .unwrap();
        let side_chat = db
            .insert_chat(Chat::new(ChatKind::Conversation, [bob.id, carol.id]))
            .await
            .unwrap();

        let cors = config.server.cors.clone();
        let state = AppState::new(config, db);
        let router = build_app(state.clone(), &cors);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = router.clone();
        tokio::spawn(async move {
            axum::serve(listener, served).await.unwrap();
        });

        Self {
            addr,
            router,
            state,
            alice,
            bob,
            carol,
            chat,
            side_chat,
        }
    }

    /// A valid access token for `user`.
    pub fn token(&self, user: &User) -> String {
        self.state
            .jwt_encoder
            .generate_access_token(user.id, &user.username)
            .unwrap()
            .0
    }

    /// Open a socket, authenticating with the `token` query parameter.
    pub async fn connect(&self, path: &str, user: Option<&User>) -> WsClient {
        let url = match user {
            Some(user) => format!("ws://{}{}?token={}", self.addr, path, self.token(user)),
            None => format!("ws://{}{}", self.addr, path),
        };
        let (ws, _) = connect_async(url).await.unwrap();
        ws
    }

    /// Open a socket, authenticating with an `Authorization` header.
    pub async fn connect_with_header(&self, path: &str, user: &User) -> WsClient {
        let mut request = format!("ws://{}{}", self.addr, path)
            .into_client_request()
            .unwrap();
        request.headers_mut().insert(
            AUTHORIZATION,
            format!("Bearer {}", self.token(user)).parse().unwrap(),
        );
        let (ws, _) = connect_async(request).await.unwrap();
        ws
    }

    pub fn chat_path(&self, chat: &Chat) -> String {
        format!("/ws/chat/{}/", chat.id)
    }

    /// Wait until `user` has an active presence session.
    pub async fn wait_for_presence(&self, user: &User) {
        let sessions = self.state.realtime.sessions.clone();
        let id = user.id;
        eventually(|| {
            let sessions = sessions.clone();
            async move { sessions.is_presence_active(id).await.unwrap() }
        })
        .await;
    }

    /// Wait until `user` has an active chat session on `chat`.
    pub async fn wait_for_chat_session(&self, user: &User, chat: &Chat) {
        let sessions = self.state.realtime.sessions.clone();
        let (user_id, chat_id) = (user.id, chat.id);
        eventually(|| {
            let sessions = sessions.clone();
            async move {
                sessions
                    .has_active_chat_session(user_id, chat_id)
                    .await
                    .unwrap()
            }
        })
        .await;
    }

    /// Wait until `user` is notification-eligible.
    pub async fn wait_for_notifications(&self, user: &User) {
        let sessions = self.state.realtime.sessions.clone();
        let id = user.id;
        eventually(|| {
            let sessions = sessions.clone();
            async move { sessions.is_notification_eligible(id).await.unwrap() }
        })
        .await;
    }
}

/// Poll `check` until it holds, failing after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached in time");
}

/// Send a chat message frame.
pub async fn send_text(ws: &mut WsClient, content: &str) {
    let payload = serde_json::json!({"type": "TEXT", "content": content}).to_string();
    ws.send(Message::Text(payload.into())).await.unwrap();
}

/// Next JSON text frame, skipping control frames.
pub async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("socket ended")
            .expect("socket error");
        match frame {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Close(frame) => panic!("unexpected close: {frame:?}"),
            _ => continue,
        }
    }
}

/// Next `count` JSON frames, in arrival order.
pub async fn recv_many(ws: &mut WsClient, count: usize) -> Vec<Value> {
    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        frames.push(recv_json(ws).await);
    }
    frames
}

/// Wait for the close frame and return its code.
pub async fn recv_close_code(ws: &mut WsClient) -> u16 {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for close")
            .expect("socket ended without a close frame")
            .expect("socket error");
        match frame {
            Message::Close(Some(close)) => return u16::from(close.code),
            Message::Close(None) => panic!("close frame without a code"),
            Message::Text(text) => panic!("unexpected text before close: {}", text.as_str()),
            _ => continue,
        }
    }
}

/// Assert that no text frame arrives within `ms` milliseconds.
pub async fn assert_silent(ws: &mut WsClient, ms: u64) {
    let deadline = tokio::time::sleep(Duration::from_millis(ms));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => return,
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => panic!("unexpected frame: {}", text.as_str()),
                Some(Ok(_)) => continue,
                _ => return,
            },
        }
    }
}
