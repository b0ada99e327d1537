//! Common Test Utilities
//!
//! Builds the full router over in-memory stores and drives it with
//! `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_core::config::{
    CorsSettings, DatabaseSettings, JwtSettings, MessageSettings, PasswordSettings, RoomSeed,
    ServerSettings, Settings, SnowflakeSettings, StorageBackend, StorageSettings,
};
use chat_core::domain::{RoomId, RoomRole, UserId};
use chat_core::infrastructure::memory::InMemoryRoomDirectory;
use chat_core::presentation::http::create_router;
use chat_core::shared::clock::ManualClock;
use chat_core::startup::AppState;

/// Room every registered test user can be joined to
pub const GENERAL_ROOM: RoomId = 42;

/// Room that exists but test users are not joined to by default
pub const PRIVATE_ROOM: RoomId = 99;

pub const TEST_PASSWORD: &str = "correct-horse-42";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        storage: StorageSettings {
            backend: StorageBackend::Memory,
            database: DatabaseSettings {
                url: String::new(),
                max_connections: 1,
                min_connections: 1,
                acquire_timeout: 1,
                run_migrations: false,
            },
        },
        jwt: JwtSettings {
            secret: "integration-test-secret-0123456789abcdef".into(),
            access_token_ttl_minutes: 60,
        },
        // Cheap Argon2 so the suite stays fast
        password: PasswordSettings {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        },
        messages: MessageSettings::default(),
        snowflake: SnowflakeSettings {
            machine_id: 7,
            epoch: 1420070400000,
        },
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        rooms: vec![closed_room(GENERAL_ROOM, "general"), closed_room(PRIVATE_ROOM, "private")],
        environment: "test".into(),
    }
}

/// A room seed with no members.
pub fn closed_room(id: RoomId, name: &str) -> RoomSeed {
    RoomSeed {
        id,
        name: name.into(),
        open: false,
        members: vec![],
    }
}

/// A registered user and its session token.
pub struct Registered {
    pub id: UserId,
    pub token: String,
}

/// Test application
pub struct TestApp {
    pub router: Router,
    pub rooms: Arc<InMemoryRoomDirectory>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Fresh application with rooms 42 and 99 and no users.
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (state, rooms) =
            AppState::in_memory(settings, clock.clone()).expect("failed to build state");

        Self {
            router: create_router(state),
            rooms,
            clock,
        }
    }

    /// Send a request and decode the JSON body (`Null` when empty).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_raw(method, uri, token, body.map(|b| b.to_string()))
            .await
    }

    /// Like [`TestApp::request`] but with the body sent verbatim.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is not JSON")
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Register `username` with [`TEST_PASSWORD`].
    pub async fn register(&self, username: &str) -> Registered {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        Registered {
            id: body["user"]["id"].as_str().unwrap().parse().unwrap(),
            token: body["access_token"].as_str().unwrap().to_owned(),
        }
    }

    /// Register `username` and join it to [`GENERAL_ROOM`] as a member.
    pub async fn register_member(&self, username: &str) -> Registered {
        let user = self.register(username).await;
        self.join(GENERAL_ROOM, user.id, RoomRole::Member);
        user
    }

    pub fn join(&self, room_id: RoomId, user_id: UserId, role: RoomRole) {
        self.rooms
            .add_member(room_id, user_id, role)
            .expect("room exists");
    }

    /// Post a text message and return its ID.
    pub async fn send(&self, room_id: RoomId, token: &str, content: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/api/v1/rooms/{}/messages", room_id),
                token,
                json!({ "content": content }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "send failed: {}", body);
        body["id"].as_str().unwrap().to_owned()
    }
}
