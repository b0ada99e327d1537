//! Message entity and the message store trait.
//!
//! Maps to the `messages` and `message_read_cursors` tables.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MessageId, RoomId, UserId};
use crate::shared::error::StoreError;

/// Kind of message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A regular user message
    #[default]
    Text,
    /// A message whose content references an image
    Image,
    /// A message whose content references a file
    File,
    /// Server-generated notice
    System,
}

impl MessageType {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::System => "system",
        }
    }

    /// Check if this is a system message type.
    pub fn is_system(&self) -> bool {
        matches!(self, Self::System)
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            "system" => Ok(Self::System),
            other => Err(format!("unknown message type '{}'", other)),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in a room.
///
/// `room_id`, `user_id` and `username` are fixed at send time. `username` is a
/// snapshot and does not follow later renames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID, increasing in commit order within a room
    pub id: MessageId,

    pub room_id: RoomId,

    /// Author user ID
    pub user_id: UserId,

    /// Author username at send time
    pub username: String,

    pub content: String,

    #[serde(rename = "type")]
    pub message_type: MessageType,

    pub is_edited: bool,

    pub edited_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// A message that has been admitted but not yet assigned an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub username: String,
    pub content: String,
    pub message_type: MessageType,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// Attach the store-assigned ID.
    pub fn into_message(self, id: MessageId) -> Message {
        Message {
            id,
            room_id: self.room_id,
            user_id: self.user_id,
            username: self.username,
            content: self.content,
            message_type: self.message_type,
            is_edited: false,
            edited_at: None,
            created_at: self.created_at,
        }
    }
}

/// Keyset pagination window over a room's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageWindow {
    /// Only messages with an ID below this one
    pub before: Option<MessageId>,
    /// Only messages with an ID above this one
    pub after: Option<MessageId>,
    pub limit: u32,
}

impl MessageWindow {
    /// With only `after` set the page is anchored at the oldest matching
    /// message; otherwise at the newest.
    pub fn anchored_at_oldest(&self) -> bool {
        self.after.is_some() && self.before.is_none()
    }
}

/// A user's read position in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadCursor {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub last_read_message_id: MessageId,
}

/// Message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message, assigning its ID.
    ///
    /// ID assignment and insert are serialized per room, so IDs within a room
    /// are unique and increase in commit order.
    async fn append(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// Find a message by its Snowflake ID.
    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StoreError>;

    /// Page through a room's messages; results are in ascending ID order.
    async fn list(&self, room_id: RoomId, window: MessageWindow) -> Result<Vec<Message>, StoreError>;

    /// Replace content and mark as edited. `StoreError::NotFound` if absent.
    async fn update_content(
        &self,
        id: MessageId,
        content: &str,
        edited_at: DateTime<Utc>,
    ) -> Result<Message, StoreError>;

    /// Delete a message. `StoreError::NotFound` if absent.
    async fn delete(&self, id: MessageId) -> Result<(), StoreError>;

    /// Number of messages stored for a room.
    async fn count_in_room(&self, room_id: RoomId) -> Result<i64, StoreError>;

    /// Move the read cursor forward to `message_id`; never moves it back.
    /// Returns the cursor position after the call.
    async fn advance_read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
        message_id: MessageId,
    ) -> Result<MessageId, StoreError>;

    /// Current read cursor, if the user has read anything in the room.
    async fn read_cursor(
        &self,
        room_id: RoomId,
        user_id: UserId,
    ) -> Result<Option<MessageId>, StoreError>;
}
