//! Message Repository Implementation
//!
//! PostgreSQL implementation of `MessageStore` with keyset pagination and
//! per-user read cursors.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Message, MessageId, MessageStore, MessageWindow, NewMessage, RoomId, UserId,
};
use crate::shared::error::StoreError;
use crate::shared::snowflake::SnowflakeGenerator;

const MESSAGE_COLUMNS: &str =
    "id, room_id, user_id, username, content, message_type, is_edited, edited_at, created_at";

/// PostgreSQL message store.
///
/// IDs are generated inside the insert transaction while the room row is
/// locked, so appends to one room commit in ID order.
pub struct PgMessageStore {
    pool: PgPool,
    id_generator: Arc<SnowflakeGenerator>,
}

impl PgMessageStore {
    /// Creates a new PgMessageStore with the given connection pool.
    pub fn new(pool: PgPool, id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self { pool, id_generator }
    }
}

/// Internal row type for message queries.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    room_id: i64,
    user_id: i64,
    username: String,
    content: String,
    message_type: String,
    is_edited: bool,
    edited_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    /// Converts database row to domain Message entity.
    fn into_message(self) -> Result<Message, StoreError> {
        Ok(Message {
            id: self.id,
            room_id: self.room_id,
            user_id: self.user_id,
            username: self.username,
            content: self.content,
            message_type: self.message_type.parse().map_err(StoreError::Backend)?,
            is_edited: self.is_edited,
            edited_at: self.edited_at,
            created_at: self.created_at,
        })
    }
}

/// Keyset page query. Newest-anchored pages are read descending and
/// reversed by the caller.
fn list_query(anchored_at_oldest: bool) -> String {
    format!(
        r#"
        SELECT {}
        FROM messages
        WHERE room_id = $1
          AND ($2::BIGINT IS NULL OR id < $2)
          AND ($3::BIGINT IS NULL OR id > $3)
        ORDER BY id {}
        LIMIT $4
        "#,
        MESSAGE_COLUMNS,
        if anchored_at_oldest { "ASC" } else { "DESC" }
    )
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Serializes ID assignment per room.
        let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
            .bind(message.room_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            return Err(StoreError::RoomNotFound(message.room_id));
        }

        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            INSERT INTO messages (id, room_id, user_id, username, content, message_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(self.id_generator.generate())
        .bind(message.room_id)
        .bind(message.user_id)
        .bind(&message.username)
        .bind(&message.content)
        .bind(message.message_type.as_str())
        .bind(message.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.into_message()
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {} FROM messages WHERE id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    async fn list(&self, room_id: RoomId, window: MessageWindow) -> Result<Vec<Message>, StoreError> {
        let ascending = window.anchored_at_oldest();

        let rows = sqlx::query_as::<_, MessageRow>(&list_query(ascending))
            .bind(room_id)
            .bind(window.before)
            .bind(window.after)
            .bind(i64::from(window.limit))
            .fetch_all(&self.pool)
            .await?;

        let mut messages = rows
            .into_iter()
            .map(MessageRow::into_message)
            .collect::<Result<Vec<_>, _>>()?;
        if !ascending {
            messages.reverse();
        }

        Ok(messages)
    }

    async fn update_content(
        &self,
        id: MessageId,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Message, StoreError> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            r#"
            UPDATE messages
            SET content = $2, is_edited = TRUE, edited_at = $3
            WHERE id = $1
            RETURNING {}
            "#,
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .bind(content)
        .bind(edited_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        row.into_message()
    }

    async fn delete(&self, id: MessageId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn count_in_room(&self, room_id: RoomId) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM messages WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn advance_read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<MessageId, StoreError> {
        let cursor = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO message_read_cursors (room_id, user_id, last_read_message_id, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (room_id, user_id) DO UPDATE
            SET last_read_message_id = GREATEST(
                    message_read_cursors.last_read_message_id,
                    EXCLUDED.last_read_message_id
                ),
                updated_at = NOW()
            RETURNING last_read_message_id
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .bind(message_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cursor)
    }

    async fn read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, StoreError> {
        let cursor = sqlx::query_scalar::<_, i64>(
            "SELECT last_read_message_id FROM message_read_cursors WHERE room_id = $1 AND user_id = $2",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cursor)
    }
}
