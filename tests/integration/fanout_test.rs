//! Presence-aware fan-out, end to end.

use crate::helpers::{TestApp, assert_silent, recv_json, recv_many, send_text};

#[tokio::test]
async fn test_watching_member_gets_room_message_and_list_refresh() {
    let app = TestApp::spawn().await;
    let path = app.chat_path(&app.chat);

    let mut bob_chat = app.connect(&path, Some(&app.bob)).await;
    let mut bob_list = app.connect("/ws/chat/list/", Some(&app.bob)).await;
    let mut bob_notes = app
        .connect("/ws/notification/list/", Some(&app.bob))
        .await;
    let mut alice_chat = app.connect(&path, Some(&app.alice)).await;
    app.wait_for_chat_session(&app.bob, &app.chat).await;
    app.wait_for_presence(&app.bob).await;
    app.wait_for_notifications(&app.bob).await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    send_text(&mut alice_chat, "hello bob").await;

    let room = recv_json(&mut bob_chat).await;
    assert_eq!(room["type"], "CHAT_MESSAGE");
    assert_eq!(room["data"]["content"], "hello bob");
    assert_eq!(room["data"]["user_id"], app.alice.id.to_string());

    let refresh = recv_json(&mut bob_list).await;
    assert_eq!(refresh["type"], "CHAT");
    assert_eq!(refresh["data"]["id"], app.chat.id.to_string());
    assert_eq!(refresh["data"]["users"][0]["username"], "alice");
    assert_eq!(refresh["data"]["latest_message"]["content"], "hello bob");

    assert_silent(&mut bob_notes, 300).await;

    let sender = recv_many(&mut alice_chat, 2).await;
    assert!(sender.iter().any(|f| f["type"] == "MESSAGE_ACK"));
}

#[tokio::test]
async fn test_away_member_gets_notification_only() {
    let app = TestApp::spawn().await;

    let mut bob_notes = app
        .connect("/ws/notification/list/", Some(&app.bob))
        .await;
    let mut alice_chat = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_notifications(&app.bob).await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    send_text(&mut alice_chat, "are you there?").await;

    let note = recv_json(&mut bob_notes).await;
    assert_eq!(note["type"], "NEW_MESSAGE");
    assert_eq!(note["data"]["chat"]["id"], app.chat.id.to_string());
    assert_eq!(note["data"]["user"]["username"], "alice");
    assert_eq!(note["data"]["message"]["content"], "are you there?");

    let _ = recv_many(&mut alice_chat, 2).await;
    let metrics = app.state.realtime.metrics.snapshot();
    assert_eq!(metrics.notifications, 1);
    assert_eq!(metrics.list_refreshes, 0);
}

#[tokio::test]
async fn test_member_in_another_chat_is_notified() {
    let app = TestApp::spawn().await;

    let mut bob_side = app
        .connect(&app.chat_path(&app.side_chat), Some(&app.bob))
        .await;
    let mut bob_notes = app
        .connect("/ws/notification/list/", Some(&app.bob))
        .await;
    let mut alice_chat = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_chat_session(&app.bob, &app.side_chat).await;
    app.wait_for_notifications(&app.bob).await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    send_text(&mut alice_chat, "over here").await;

    let note = recv_json(&mut bob_notes).await;
    assert_eq!(note["type"], "NEW_MESSAGE");
    assert_eq!(note["data"]["chat"]["id"], app.chat.id.to_string());

    assert_silent(&mut bob_side, 300).await;
}

#[tokio::test]
async fn test_offline_member_receives_nothing() {
    let app = TestApp::spawn().await;

    let mut alice_chat = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    send_text(&mut alice_chat, "anyone?").await;
    let frames = recv_many(&mut alice_chat, 2).await;
    assert!(frames.iter().any(|f| f["type"] == "MESSAGE_ACK"));

    let metrics = app.state.realtime.metrics.snapshot();
    assert_eq!(metrics.fanout_runs, 1);
    assert_eq!(metrics.list_refreshes, 0);
    assert_eq!(metrics.notifications, 0);
}
