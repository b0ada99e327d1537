//! User Repository Implementation
//!
//! PostgreSQL implementation of `CredentialStore` and `PresenceStore`.
//! Maps between the `users` table and the domain `User` entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    CredentialStore, PresenceOutcome, PresenceStore, PresenceUpdate, UnknownStatus, User, UserId,
};
use crate::shared::error::{StoreError, UniqueField};

const USER_COLUMNS: &str = "id, username, email, avatar_url, status, last_seen, created_at";

/// Database row representation of the users table, minus the password hash.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    avatar_url: Option<String>,
    status: String,
    last_seen: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert database row to domain User entity.
    fn into_user(self) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            username: self.username,
            email: self.email,
            avatar_url: self.avatar_url,
            status: self
                .status
                .parse()
                .map_err(|e: UnknownStatus| StoreError::Backend(e.to_string()))?,
            last_seen: self.last_seen,
            created_at: self.created_at,
        })
    }
}

/// Which uniqueness constraint a violation came from.
fn unique_field_of(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some(name) if name.contains("username") => UniqueField::Username,
        _ => UniqueField::Email,
    }
}

/// PostgreSQL user store.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE {} = $1",
            USER_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgUserStore {
    /// Create a new user in the database.
    ///
    /// Uniqueness is enforced by the `users_username_key` and
    /// `users_email_key` constraints.
    async fn create(&self, user: &User, password_hash: &str) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, avatar_url, status, last_seen, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.avatar_url)
        .bind(user.status.as_str())
        .bind(user.last_seen)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Duplicate(unique_field_of(db_err.constraint()))
            }
            _ => StoreError::from(e),
        })?;

        row.into_user()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn password_hash(&self, id: UserId) -> Result<Option<String>, StoreError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(hash)
    }
}

#[async_trait]
impl PresenceStore for PgUserStore {
    /// The sequence guard lives in the `WHERE` clause, so check and write are
    /// one statement.
    async fn apply_presence(
        &self,
        id: UserId,
        update: PresenceUpdate,
    ) -> Result<PresenceOutcome, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET status = $2,
                last_seen = GREATEST(last_seen, COALESCE($3, last_seen)),
                presence_seq = $4
            WHERE id = $1 AND presence_seq < $4
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.status.as_str())
        .bind(update.last_seen)
        .bind(update.sequence)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(PresenceOutcome {
                user: row.into_user()?,
                applied: true,
            });
        }

        // Either the user is gone or a newer update already landed.
        match self.find_by_id(id).await? {
            Some(user) => Ok(PresenceOutcome {
                user,
                applied: false,
            }),
            None => Err(StoreError::NotFound),
        }
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET last_seen = GREATEST(last_seen, $2) WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        row.into_user()
    }
}
