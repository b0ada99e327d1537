//! In-memory room directory.
//!
//! Rooms are administered outside the core; this directory exposes
//! `create_room`, `add_member` and `set_open` so the process (or a test) can
//! seed them.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{Room, RoomId, RoomMembership, RoomRole, UserId};
use crate::shared::error::StoreError;

struct RoomEntry {
    room: Room,
    members: HashMap<UserId, RoomRole>,
    /// Every existing user counts as a `Member` unless listed otherwise
    open: bool,
}

/// Process-local [`RoomMembership`].
#[derive(Default)]
pub struct InMemoryRoomDirectory {
    rooms: DashMap<RoomId, RoomEntry>,
}

impl InMemoryRoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or rename) a room.
    pub fn create_room(&self, id: RoomId, name: &str, created_at: DateTime<Utc>) -> Room {
        let mut entry = self.rooms.entry(id).or_insert_with(|| RoomEntry {
            room: Room {
                id,
                name: name.to_owned(),
                created_at,
            },
            members: HashMap::new(),
            open: false,
        });
        entry.room.name = name.to_owned();
        entry.room.clone()
    }

    /// Add a member to a room, or change their role.
    pub fn add_member(&self, room_id: RoomId, user_id: UserId, role: RoomRole) -> Result<(), StoreError> {
        let mut entry = self
            .rooms
            .get_mut(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))?;
        entry.members.insert(user_id, role);
        Ok(())
    }

    /// Open or close a room to every user.
    pub fn set_open(&self, room_id: RoomId, open: bool) -> Result<(), StoreError> {
        let mut entry = self
            .rooms
            .get_mut(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))?;
        entry.open = open;
        Ok(())
    }
}

#[async_trait]
impl RoomMembership for InMemoryRoomDirectory {
    async fn role(&self, room_id: RoomId, user_id: UserId) -> Result<Option<RoomRole>, StoreError> {
        let entry = self
            .rooms
            .get(&room_id)
            .ok_or(StoreError::RoomNotFound(room_id))?;
        let listed = entry.members.get(&user_id).copied();
        Ok(listed.or_else(|| entry.open.then_some(RoomRole::Member)))
    }
}
