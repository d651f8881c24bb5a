//! HTTP health endpoint.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use crate::helpers::{TestApp, recv_close_code};

#[tokio::test]
async fn test_health_counts_open_connections() {
    let app = TestApp::spawn().await;
    let _list = app.connect("/ws/chat/list/", Some(&app.alice)).await;
    app.wait_for_presence(&app.alice).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["connections"]["list"], 1);
    assert_eq!(json["data"]["metrics"]["connections_opened"], 1);
}

#[tokio::test]
async fn test_shutdown_sends_going_away() {
    let app = TestApp::spawn().await;
    let mut ws = app
        .connect(&app.chat_path(&app.chat), Some(&app.alice))
        .await;
    app.wait_for_chat_session(&app.alice, &app.chat).await;

    app.state.realtime.shutdown();

    assert_eq!(recv_close_code(&mut ws).await, 1001);
}
