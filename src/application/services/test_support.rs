//! Shared fixtures for service unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;

use crate::config::{JwtSettings, MessageSettings, PasswordSettings};
use crate::domain::{
    CredentialStore, Message, MessageId, MessageStore, MessageWindow, NewMessage, PresenceOutcome,
    PresenceStore, PresenceUpdate, RoomId, User, UserId,
};
use crate::shared::error::StoreError;

mock! {
    pub UserStore {}

    #[async_trait]
    impl CredentialStore for UserStore {
        async fn create(&self, user: &User, password_hash: &str) -> Result<User, StoreError>;
        async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
        async fn password_hash(&self, id: UserId) -> Result<Option<String>, StoreError>;
    }

    #[async_trait]
    impl PresenceStore for UserStore {
        async fn apply_presence(&self, id: UserId, update: PresenceUpdate) -> Result<PresenceOutcome, StoreError>;
        async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<User, StoreError>;
    }
}

mock! {
    pub Messages {}

    #[async_trait]
    impl MessageStore for Messages {
        async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;
        async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StoreError>;
        async fn list(&self, room_id: RoomId, window: MessageWindow) -> Result<Vec<Message>, StoreError>;
        async fn update_content(&self, id: MessageId, content: &str, edited_at: DateTime<Utc>) -> Result<Message, StoreError>;
        async fn delete(&self, id: MessageId) -> Result<(), StoreError>;
        async fn count_in_room(&self, room_id: RoomId) -> Result<i64, StoreError>;
        async fn advance_read_cursor(&self, room_id: RoomId, user_id: UserId, message_id: MessageId) -> Result<MessageId, StoreError>;
        async fn read_cursor(&self, room_id: RoomId, user_id: UserId) -> Result<Option<MessageId>, StoreError>;
    }
}

pub const TEST_SECRET: &str = "test-secret-that-is-at-least-32-characters";

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: TEST_SECRET.into(),
        access_token_ttl_minutes: 60,
    }
}

/// Cheap Argon2 parameters; the production baseline makes tests crawl.
pub fn fast_password_settings() -> PasswordSettings {
    PasswordSettings {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

pub fn message_settings() -> MessageSettings {
    MessageSettings::default()
}
