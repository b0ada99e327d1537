//! Authentication API Tests

use axum::http::{Method, StatusCode};
use chrono::Duration;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{TestApp, TEST_PASSWORD};

const REGISTER: &str = "/api/v1/auth/register";
const LOGIN: &str = "/api/v1/auth/login";
const LOGOUT: &str = "/api/v1/auth/logout";
const ME: &str = "/api/v1/users/@me";

#[tokio::test]
async fn test_register_with_valid_data() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            REGISTER,
            None,
            Some(json!({
                "username": "alice",
                "email": "Alice@Example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["status"], "offline");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = TestApp::new();
    app.register("alice").await;

    let (status, body) = app
        .request(
            Method::POST,
            REGISTER,
            None,
            Some(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 10005);
}

#[tokio::test]
async fn test_register_duplicate_email_ignores_case() {
    let app = TestApp::new();
    app.register("alice").await;

    let (status, _) = app
        .request(
            Method::POST,
            REGISTER,
            None,
            Some(json!({
                "username": "alice2",
                "email": "ALICE@example.com",
                "password": TEST_PASSWORD,
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_invalid_input() {
    let app = TestApp::new();

    for body in [
        json!({ "username": "al", "email": "al@example.com", "password": TEST_PASSWORD }),
        json!({ "username": "alice", "email": "not-an-email", "password": TEST_PASSWORD }),
        json!({ "username": "alice", "email": "alice@example.com", "password": "short1" }),
        json!({ "username": "alice", "email": "alice@example.com", "password": "lettersonly" }),
    ] {
        let (status, response) = app.request(Method::POST, REGISTER, None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted: {}", response);
    }
}

#[tokio::test]
async fn test_login_by_username_and_email() {
    let app = TestApp::new();
    app.register("alice").await;

    for identifier in ["alice", "ALICE@example.com"] {
        let (status, body) = app
            .request(
                Method::POST,
                LOGIN,
                None,
                Some(json!({ "identifier": identifier, "password": TEST_PASSWORD })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login as {} failed", identifier);
        assert_eq!(body["user"]["username"], "alice");
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("alice").await;

    let (wrong_password, wrong_body) = app
        .request(
            Method::POST,
            LOGIN,
            None,
            Some(json!({ "username": "alice", "password": "wrong-password-1" })),
        )
        .await;
    let (unknown_user, unknown_body) = app
        .request(
            Method::POST,
            LOGIN,
            None,
            Some(json!({ "username": "mallory", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_logout_revokes_only_that_session() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    let (_, second) = app
        .request(
            Method::POST,
            LOGIN,
            None,
            Some(json!({ "identifier": "alice", "password": TEST_PASSWORD })),
        )
        .await;
    let second_token = second["access_token"].as_str().unwrap();

    let (status, body) = app
        .request(Method::POST, LOGOUT, Some(&alice.token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (revoked, _) = app.get(ME, &alice.token).await;
    let (still_valid, _) = app.get(ME, second_token).await;

    assert_eq!(revoked, StatusCode::UNAUTHORIZED);
    assert_eq!(still_valid, StatusCode::OK);
}

#[tokio::test]
async fn test_token_expires_after_ttl() {
    let app = TestApp::new();
    let alice = app.register("alice").await;

    app.clock.advance(Duration::minutes(59));
    let (status, _) = app.get(ME, &alice.token).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::minutes(2));
    let (status, body) = app.get(ME, &alice.token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 10003);
}

#[tokio::test]
async fn test_protected_route_requires_bearer_token() {
    let app = TestApp::new();

    let (missing, _) = app.request(Method::GET, ME, None, None).await;
    let (garbage, _) = app.get(ME, "not-a-jwt").await;

    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_body_gets_json_error() {
    let app = TestApp::new();

    let (status, body) = app
        .request_raw(Method::POST, REGISTER, None, Some("{\"username\": ".into()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10002);
    assert!(body["message"].is_string());

    // Well-formed JSON missing a required field
    let (status, body) = app
        .request(Method::POST, LOGIN, None, Some(json!({ "identifier": "alice" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 10002);
}
