//! User entity and the store traits that persist it.
//!
//! Maps to the `users` table in the database schema.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::shared::error::StoreError;

/// User presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Offline,
    Online,
    Away,
    Dnd,
}

impl UserStatus {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Online => "online",
            Self::Away => "away",
            Self::Dnd => "dnd",
        }
    }
}

/// Returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" | "idle" => Ok(Self::Away),
            "dnd" => Ok(Self::Dnd),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user account as seen outside the credential store.
///
/// The password hash is not part of this type; it is only reachable through
/// [`CredentialStore::password_hash`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: UserId,

    /// Username (3-32 characters, unique, case-sensitive)
    pub username: String,

    /// Email address (unique, stored lowercased)
    pub email: String,

    /// URL to user's avatar image
    pub avatar_url: Option<String>,

    /// User's presence status
    #[serde(default)]
    pub status: UserStatus,

    /// Last time the user was seen; never moves backwards
    pub last_seen: DateTime<Utc>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered user: offline, last seen at creation.
    pub fn new_registered(
        id: UserId,
        username: String,
        email: String,
        avatar_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            avatar_url,
            status: UserStatus::Offline,
            last_seen: now,
            created_at: now,
        }
    }
}

/// A sequence-stamped presence change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceUpdate {
    pub status: UserStatus,
    /// New last-seen candidate; applied as `max(current, candidate)`.
    pub last_seen: Option<DateTime<Utc>>,
    /// Server-assigned, strictly increasing per issuing process.
    pub sequence: i64,
}

/// Result of [`PresenceStore::apply_presence`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceOutcome {
    /// The user as stored after the call.
    pub user: User,
    /// False when the update was older than the stored one and was dropped.
    pub applied: bool,
}

/// Persistence of user records and password hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user. Fails with `StoreError::Duplicate` if the username or
    /// email is taken; the check and insert are atomic.
    async fn create(&self, user: &User, password_hash: &str) -> Result<User, StoreError>;

    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Fetch the stored password hash.
    async fn password_hash(&self, id: UserId) -> Result<Option<String>, StoreError>;
}

/// Persistence of presence state.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Apply `update` only if its sequence is newer than the last applied one.
    /// Fails with `StoreError::NotFound` if the user does not exist.
    async fn apply_presence(
        &self,
        id: UserId,
        update: PresenceUpdate,
    ) -> Result<PresenceOutcome, StoreError>;

    /// Advance `last_seen` to `at` unless it is already later.
    /// Fails with `StoreError::NotFound` if the user does not exist.
    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<User, StoreError>;
}
