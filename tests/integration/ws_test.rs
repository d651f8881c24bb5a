//! Connection lifecycle and close codes over real sockets.

use futures::SinkExt;
use tokio_tungstenite::tungstenite::Message;

use parley_realtime::SessionStore;

use crate::helpers::{TestApp, eventually, recv_close_code, recv_json, send_text};

#[tokio::test]
async fn test_anonymous_list_connection_is_closed_4003() {
    let app = TestApp::spawn().await;
    let mut ws = app.connect("/ws/chat/list/", None).await;
    assert_eq!(recv_close_code(&mut ws).await, 4003);
}

#[tokio::test]
async fn test_bad_token_on_notifications_is_closed_4003() {
    let app = TestApp::spawn().await;
    let url = format!("ws://{}/ws/notification/list/?token=not-a-jwt", app.addr);
    let (mut ws, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    assert_eq!(recv_close_code(&mut ws).await, 4003);
}

#[tokio::test]
async fn test_unparseable_chat_id_is_closed_3003() {
    let app = TestApp::spawn().await;
    let mut ws = app.connect("/ws/chat/42/", Some(&app.alice)).await;
    assert_eq!(recv_close_code(&mut ws).await, 3003);
}

#[tokio::test]
async fn test_outsider_is_closed_4004() {
    let app = TestApp::spawn().await;
    let mut ws = app
        .connect(&app.chat_path(&app.chat), Some(&app.carol))
        .await;
    assert_eq!(recv_close_code(&mut ws).await, 4004);
}

#[tokio::test]
async fn test_malformed_message_is_closed_3001() {
    let app = TestApp::spawn().await;
    let mut ws = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    ws.send(Message::Text("{\"type\":\"TEXT\"}".into()))
        .await
        .unwrap();
    assert_eq!(recv_close_code(&mut ws).await, 3001);

    let sessions = app.state.realtime.sessions.clone();
    let (user, chat) = (app.alice.id, app.chat.id);
    eventually(|| {
        let sessions = sessions.clone();
        async move { !sessions.has_active_chat_session(user, chat).await.unwrap() }
    })
    .await;
    assert_eq!(app.state.realtime.metrics.snapshot().fanout_runs, 0);
}

#[tokio::test]
async fn test_header_credentials_open_presence() {
    let app = TestApp::spawn().await;
    let mut ws = app.connect_with_header("/ws/chat/list/", &app.bob).await;
    app.wait_for_presence(&app.bob).await;

    ws.close(None).await.unwrap();

    let sessions = app.state.realtime.sessions.clone();
    let user = app.bob.id;
    eventually(|| {
        let sessions = sessions.clone();
        async move { !sessions.is_presence_active(user).await.unwrap() }
    })
    .await;
}

#[tokio::test]
async fn test_sender_gets_ack() {
    let app = TestApp::spawn().await;
    let mut ws = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    send_text(&mut ws, "ping?").await;

    // Ack and room echo may arrive in either order.
    let first = recv_json(&mut ws).await;
    let second = recv_json(&mut ws).await;
    let types = [first["type"].clone(), second["type"].clone()];
    assert!(types.contains(&"MESSAGE_ACK".into()));
    assert!(types.contains(&"CHAT_MESSAGE".into()));
}

#[tokio::test]
async fn test_reconnect_leaves_no_active_chat_session() {
    let app = TestApp::spawn().await;
    let path = app.chat_path(&app.chat);

    let mut first = app.connect(&path, Some(&app.bob)).await;
    app.wait_for_chat_session(&app.bob, &app.chat).await;
    let mut second = app.connect(&path, Some(&app.bob)).await;
    app.wait_for_chat_session(&app.bob, &app.chat).await;

    let _ = first.close(None).await;
    let _ = second.close(None).await;

    let sessions = app.state.realtime.sessions.clone();
    let (user, chat) = (app.bob.id, app.chat.id);
    eventually(|| {
        let sessions = sessions.clone();
        async move { !sessions.has_active_chat_session(user, chat).await.unwrap() }
    })
    .await;
    let connections = app.state.realtime.connections.clone();
    eventually(|| {
        let connections = connections.clone();
        async move { connections.connection_count() == 0 }
    })
    .await;
}
