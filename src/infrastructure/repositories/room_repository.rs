//! Room Membership Repository Implementation
//!
//! Read-only PostgreSQL implementation of `RoomMembership` over the `rooms`
//! and `room_members` tables.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{RoomId, RoomMembership, RoomRole, UserId};
use crate::shared::error::StoreError;

/// PostgreSQL membership lookup.
#[derive(Clone)]
pub struct PgRoomMembership {
    pool: PgPool,
}

impl PgRoomMembership {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomMembership for PgRoomMembership {
    /// One round trip: the left join yields a row whenever the room exists,
    /// with a NULL role for non-members.
    async fn role(&self, room_id: RoomId, user_id: UserId) -> Result<Option<RoomRole>, StoreError> {
        let row = sqlx::query_as::<_, (i64, Option<String>)>(
            r#"
            SELECT r.id, m.role
            FROM rooms r
            LEFT JOIN room_members m ON m.room_id = r.id AND m.user_id = $2
            WHERE r.id = $1
            "#,
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::RoomNotFound(room_id))?;

        row.1
            .map(|role| role.parse::<RoomRole>().map_err(StoreError::Backend))
            .transpose()
    }
}
