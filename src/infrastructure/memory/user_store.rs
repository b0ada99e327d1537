//! In-memory user store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{
    CredentialStore, PresenceOutcome, PresenceStore, PresenceUpdate, User, UserId,
};
use crate::shared::error::{StoreError, UniqueField};

struct UserRecord {
    user: User,
    password_hash: String,
    /// Sequence of the last applied presence update
    presence_seq: i64,
}

#[derive(Default)]
struct UserTable {
    users: HashMap<UserId, UserRecord>,
    by_username: HashMap<String, UserId>,
    by_email: HashMap<String, UserId>,
}

/// Process-local [`CredentialStore`] and [`PresenceStore`].
///
/// A single lock guards the three indexes so uniqueness checks and inserts
/// are atomic with respect to each other.
#[derive(Default)]
pub struct InMemoryUserStore {
    table: RwLock<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn create(&self, user: &User, password_hash: &str) -> Result<User, StoreError> {
        let mut table = self.table.write();

        if table.by_username.contains_key(&user.username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        if table.by_email.contains_key(&user.email) {
            return Err(StoreError::Duplicate(UniqueField::Email));
        }

        table.by_username.insert(user.username.clone(), user.id);
        table.by_email.insert(user.email.clone(), user.id);
        table.users.insert(
            user.id,
            UserRecord {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
                presence_seq: 0,
            },
        );

        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.table.read().users.get(&id).map(|r| r.user.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read();
        Ok(table
            .by_username
            .get(username)
            .and_then(|id| table.users.get(id))
            .map(|r| r.user.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read();
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.users.get(id))
            .map(|r| r.user.clone()))
    }

    async fn password_hash(&self, id: UserId) -> Result<Option<String>, StoreError> {
        Ok(self
            .table
            .read()
            .users
            .get(&id)
            .map(|r| r.password_hash.clone()))
    }
}

#[async_trait]
impl PresenceStore for InMemoryUserStore {
    async fn apply_presence(
        &self,
        id: UserId,
        update: PresenceUpdate,
    ) -> Result<PresenceOutcome, StoreError> {
        let mut table = self.table.write();
        let record = table.users.get_mut(&id).ok_or(StoreError::NotFound)?;

        if update.sequence <= record.presence_seq {
            return Ok(PresenceOutcome {
                user: record.user.clone(),
                applied: false,
            });
        }

        record.presence_seq = update.sequence;
        record.user.status = update.status;
        if let Some(at) = update.last_seen {
            record.user.last_seen = record.user.last_seen.max(at);
        }

        Ok(PresenceOutcome {
            user: record.user.clone(),
            applied: true,
        })
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<User, StoreError> {
        let mut table = self.table.write();
        let record = table.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        record.user.last_seen = record.user.last_seen.max(at);
        Ok(record.user.clone())
    }
}
