//! Configured Room Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{closed_room, test_settings, TestApp};
use chat_core::config::{RoomMemberSeed, RoomSeed};
use chat_core::domain::{RoomMembership, RoomRole};

#[tokio::test]
async fn test_open_room_from_settings_accepts_messages() {
    let mut settings = test_settings();
    settings.rooms = vec![RoomSeed {
        id: 7,
        name: "lobby".into(),
        open: true,
        members: vec![],
    }];
    let app = TestApp::with_settings(settings);
    let alice = app.register("alice").await;

    let (status, body) = app
        .post("/api/v1/rooms/7/messages", &alice.token, json!({ "content": "hi" }))
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["room_id"], "7");
    assert_eq!(body["content"], "hi");

    let (status, body) = app.get("/api/v1/rooms/7/messages", &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_closed_room_from_settings_rejects_strangers() {
    let mut settings = test_settings();
    settings.rooms = vec![closed_room(8, "staff")];
    let app = TestApp::with_settings(settings);
    let alice = app.register("alice").await;

    let (status, body) = app
        .post("/api/v1/rooms/8/messages", &alice.token, json!({ "content": "hi" }))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 10004);
}

#[tokio::test]
async fn test_seeded_members_keep_their_role() {
    let mut settings = test_settings();
    settings.rooms = vec![RoomSeed {
        id: 9,
        name: "ops".into(),
        open: false,
        members: vec![RoomMemberSeed {
            user_id: 1234,
            role: RoomRole::Moderator,
        }],
    }];
    let app = TestApp::with_settings(settings);

    assert_eq!(
        app.rooms.role(9, 1234).await.unwrap(),
        Some(RoomRole::Moderator)
    );
    assert_eq!(app.rooms.role(9, 5678).await.unwrap(), None);
}

#[test]
fn test_missing_room_list_refuses_to_start() {
    let mut settings = test_settings();
    settings.rooms.clear();

    assert!(settings.validate().is_err());
}
