//! Message API Tests

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{TestApp, GENERAL_ROOM, PRIVATE_ROOM};
use chat_core::domain::RoomRole;

fn messages_uri(room_id: i64) -> String {
    format!("/api/v1/rooms/{}/messages", room_id)
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_member_sends_message() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;

    let (status, body) = app
        .post(
            &messages_uri(GENERAL_ROOM),
            &alice.token,
            json!({ "content": "hello room" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "hello room");
    assert_eq!(body["room_id"], GENERAL_ROOM.to_string());
    assert_eq!(body["user_id"], alice.id.to_string());
    assert_eq!(body["username"], "alice");
    assert_eq!(body["type"], "text");
    assert_eq!(body["is_edited"], false);
}

#[tokio::test]
async fn test_send_is_scoped_to_membership() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let body = json!({ "content": "hi" });

    let (not_member, err) = app
        .post(&messages_uri(PRIVATE_ROOM), &alice.token, body.clone())
        .await;
    assert_eq!(not_member, StatusCode::FORBIDDEN);
    assert_eq!(err["code"], 10004);

    let (no_room, _) = app.post(&messages_uri(1234), &alice.token, body).await;
    assert_eq!(no_room, StatusCode::NOT_FOUND);

    let (_, history) = app.get(&messages_uri(PRIVATE_ROOM), &alice.token).await;
    assert_eq!(history["code"], 10004);
}

#[tokio::test]
async fn test_send_rejects_invalid_content() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let uri = messages_uri(GENERAL_ROOM);

    for body in [
        json!({ "content": "" }),
        json!({ "content": "   \n\t" }),
        json!({ "content": "x".repeat(2001) }),
        json!({ "content": "hi", "type": "system" }),
        json!({ "content": "hi", "type": "carrier-pigeon" }),
    ] {
        let (status, response) = app.post(&uri, &alice.token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted: {}", response);
    }

    let (at_limit, _) = app
        .post(&uri, &alice.token, json!({ "content": "é".repeat(2000) }))
        .await;
    assert_eq!(at_limit, StatusCode::CREATED);

    let (_, history) = app.get(&uri, &alice.token).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_history_pages_oldest_first() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;

    let mut sent = Vec::new();
    for i in 0..5 {
        sent.push(app.send(GENERAL_ROOM, &alice.token, &format!("message {}", i)).await);
    }

    let uri = messages_uri(GENERAL_ROOM);

    let (status, all) = app.get(&uri, &alice.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&all), sent);

    let (_, newest) = app.get(&format!("{}?limit=2", uri), &alice.token).await;
    assert_eq!(ids(&newest), sent[3..].to_vec());

    let (_, older) = app
        .get(&format!("{}?before={}&limit=2", uri, sent[3]), &alice.token)
        .await;
    assert_eq!(ids(&older), sent[1..3].to_vec());

    let (_, newer) = app
        .get(&format!("{}?after={}&limit=2", uri, sent[0]), &alice.token)
        .await;
    assert_eq!(ids(&newer), sent[1..3].to_vec());

    let (zero, _) = app.get(&format!("{}?limit=0", uri), &alice.token).await;
    assert_eq!(zero, StatusCode::BAD_REQUEST);

    let (malformed, _) = app.get(&format!("{}?before=abc", uri), &alice.token).await;
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_message_requires_matching_room() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    app.join(PRIVATE_ROOM, alice.id, RoomRole::Member);
    let id = app.send(GENERAL_ROOM, &alice.token, "hello").await;

    let (found, body) = app
        .get(&format!("{}/{}", messages_uri(GENERAL_ROOM), id), &alice.token)
        .await;
    assert_eq!(found, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (elsewhere, body) = app
        .get(&format!("{}/{}", messages_uri(PRIVATE_ROOM), id), &alice.token)
        .await;
    assert_eq!(elsewhere, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 10001);
}

#[tokio::test]
async fn test_only_author_edits() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let bob = app.register("bob").await;
    app.join(GENERAL_ROOM, bob.id, RoomRole::Moderator);
    let id = app.send(GENERAL_ROOM, &alice.token, "typo").await;
    let uri = format!("{}/{}", messages_uri(GENERAL_ROOM), id);

    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&bob.token), Some(json!({ "content": "fixed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&alice.token), Some(json!({ "content": "fixed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "fixed");
    assert_eq!(body["is_edited"], true);
    assert!(body["edited_at"].is_string());

    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&alice.token), Some(json!({ "content": " " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_by_author_or_moderator() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let carol = app.register_member("carol").await;
    let bob = app.register("bob").await;
    app.join(GENERAL_ROOM, bob.id, RoomRole::Moderator);

    let first = app.send(GENERAL_ROOM, &alice.token, "one").await;
    let second = app.send(GENERAL_ROOM, &alice.token, "two").await;
    let uri = |id: &str| format!("{}/{}", messages_uri(GENERAL_ROOM), id);

    let (status, _) = app
        .request(Method::DELETE, &uri(&first), Some(&carol.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(Method::DELETE, &uri(&first), Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::DELETE, &uri(&second), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request(Method::DELETE, &uri(&second), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, history) = app.get(&messages_uri(GENERAL_ROOM), &alice.token).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_read_cursor_and_unread() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let bob = app.register_member("bob").await;

    let mut sent = Vec::new();
    for i in 0..4 {
        sent.push(app.send(GENERAL_ROOM, &alice.token, &format!("m{}", i)).await);
    }

    let unread_uri = format!("{}/unread", messages_uri(GENERAL_ROOM));
    let ack_uri = |id: &str| format!("{}/{}/ack", messages_uri(GENERAL_ROOM), id);

    let (_, unread) = app.get(&unread_uri, &bob.token).await;
    assert_eq!(ids(&unread), sent);

    let (status, cursor) = app
        .request(Method::POST, &ack_uri(&sent[1]), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cursor["last_read_message_id"], sent[1]);

    let (_, unread) = app.get(&unread_uri, &bob.token).await;
    assert_eq!(ids(&unread), sent[2..].to_vec());

    // Acknowledging an older message never moves the cursor back.
    let (_, cursor) = app
        .request(Method::POST, &ack_uri(&sent[0]), Some(&bob.token), None)
        .await;
    assert_eq!(cursor["last_read_message_id"], sent[1]);

    let (_, limited) = app
        .get(&format!("{}?limit=1", unread_uri), &bob.token)
        .await;
    assert_eq!(ids(&limited), vec![sent[2].clone()]);

    let (status, _) = app
        .request(Method::POST, &ack_uri("424242"), Some(&bob.token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unread_is_per_user() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;
    let bob = app.register_member("bob").await;
    let id = app.send(GENERAL_ROOM, &alice.token, "hello").await;

    app.request(
        Method::POST,
        &format!("{}/{}/ack", messages_uri(GENERAL_ROOM), id),
        Some(&alice.token),
        None,
    )
    .await;

    let unread_uri = format!("{}/unread", messages_uri(GENERAL_ROOM));
    let (_, for_alice) = app.get(&unread_uri, &alice.token).await;
    let (_, for_bob) = app.get(&unread_uri, &bob.token).await;

    assert!(for_alice.as_array().unwrap().is_empty());
    assert_eq!(ids(&for_bob), vec![id]);
}

#[tokio::test]
async fn test_register_login_send_scenario() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;

    let (status, login) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "identifier": "alice", "password": crate::common::TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second_token = login["access_token"].as_str().unwrap();

    // Both sessions resolve to the same user.
    let (_, first_me) = app.get("/api/v1/users/@me", &alice.token).await;
    let (_, second_me) = app.get("/api/v1/users/@me", second_token).await;
    assert_eq!(first_me["id"], second_me["id"]);

    let (status, message) = app
        .post(&messages_uri(GENERAL_ROOM), second_token, json!({ "content": "hello" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["username"], "alice");
    assert_eq!(message["content"], "hello");

    let (status, _) = app
        .post(&messages_uri(PRIVATE_ROOM), second_token, json!({ "content": "hi" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Joining afterwards shows the rejected send left nothing behind.
    app.join(PRIVATE_ROOM, alice.id, RoomRole::Member);
    let (_, history) = app.get(&messages_uri(PRIVATE_ROOM), &alice.token).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_query_gets_json_error() {
    let app = TestApp::new();
    let alice = app.register_member("alice").await;

    let (status, body) = app
        .get(&format!("{}?limit=lots", messages_uri(GENERAL_ROOM)), &alice.token)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10002);
}
