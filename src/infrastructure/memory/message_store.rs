//! In-memory message store.
//!
//! Each room's history is a `Vec` kept in ascending ID order. IDs are
//! generated while holding the room's map entry, so concurrent appends to one
//! room commit in ID order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::domain::{
    Message, MessageId, MessageStore, MessageWindow, NewMessage, RoomId, UserId,
};
use crate::shared::error::StoreError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Process-local [`MessageStore`].
pub struct InMemoryMessageStore {
    rooms: DashMap<RoomId, Vec<Message>>,
    /// Message ID -> room, for lookups by ID alone
    index: DashMap<MessageId, RoomId>,
    cursors: DashMap<(RoomId, UserId), MessageId>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl InMemoryMessageStore {
    pub fn new(id_generator: Arc<SnowflakeGenerator>) -> Self {
        Self {
            rooms: DashMap::new(),
            index: DashMap::new(),
            cursors: DashMap::new(),
            id_generator,
        }
    }

    fn room_of(&self, id: MessageId) -> Option<RoomId> {
        self.index.get(&id).map(|entry| *entry)
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError> {
        let room_id = message.room_id;
        let stored = {
            let mut history = self.rooms.entry(room_id).or_default();
            let stored = message.into_message(self.id_generator.generate());
            history.push(stored.clone());
            stored
        };

        self.index.insert(stored.id, room_id);
        Ok(stored)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StoreError> {
        let Some(room_id) = self.room_of(id) else {
            return Ok(None);
        };

        Ok(self.rooms.get(&room_id).and_then(|history| {
            history
                .binary_search_by_key(&id, |m| m.id)
                .ok()
                .map(|pos| history[pos].clone())
        }))
    }

    async fn list(&self, room_id: RoomId, window: MessageWindow) -> Result<Vec<Message>, StoreError> {
        let Some(history) = self.rooms.get(&room_id) else {
            return Ok(Vec::new());
        };

        let limit = window.limit as usize;
        let matching = history.iter().filter(|m| {
            window.before.map_or(true, |before| m.id < before)
                && window.after.map_or(true, |after| m.id > after)
        });

        let page: Vec<Message> = if window.anchored_at_oldest() {
            matching.take(limit).cloned().collect()
        } else {
            let mut newest: Vec<Message> = matching.rev().take(limit).cloned().collect();
            newest.reverse();
            newest
        };

        Ok(page)
    }

    async fn update_content(
        &self,
        id: MessageId,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Message, StoreError> {
        let room_id = self.room_of(id).ok_or(StoreError::NotFound)?;
        let mut history = self.rooms.get_mut(&room_id).ok_or(StoreError::NotFound)?;
        let pos = history
            .binary_search_by_key(&id, |m| m.id)
            .map_err(|_| StoreError::NotFound)?;

        let message = &mut history[pos];
        message.content = content.to_owned();
        message.is_edited = true;
        message.edited_at = Some(edited_at);

        Ok(message.clone())
    }

    async fn delete(&self, id: MessageId) -> Result<(), StoreError> {
        let (_, room_id) = self.index.remove(&id).ok_or(StoreError::NotFound)?;
        let mut history = self.rooms.get_mut(&room_id).ok_or(StoreError::NotFound)?;
        let pos = history
            .binary_search_by_key(&id, |m| m.id)
            .map_err(|_| StoreError::NotFound)?;
        history.remove(pos);
        Ok(())
    }

    async fn count_in_room(&self, room_id: RoomId) -> Result<i64, StoreError> {
        Ok(self
            .rooms
            .get(&room_id)
            .map_or(0, |history| history.len() as i64))
    }

    async fn advance_read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<MessageId, StoreError> {
        let mut cursor = self
            .cursors
            .entry((room_id, user_id))
            .or_insert(message_id);
        if *cursor < message_id {
            *cursor = message_id;
        }
        Ok(*cursor)
    }

    async fn read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, StoreError> {
        Ok(self.cursors.get(&(room_id, user_id)).map(|c| *c))
    }
}
