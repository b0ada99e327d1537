//! Room entity and membership lookup.
//!
//! Rooms and their members are administered outside this crate. The core only
//! reads them to decide who may post and read.
//!
//! Maps to the `rooms` and `room_members` tables:
//! - rooms.id: BIGINT PRIMARY KEY
//! - room_members.(room_id, user_id): composite PK
//! - room_members.role: VARCHAR(20) ('member' | 'moderator' | 'owner')

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RoomId, UserId};
use crate::shared::error::StoreError;

/// A chat room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A member's standing within a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    #[default]
    Member,
    Moderator,
    Owner,
}

impl RoomRole {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Owner => "owner",
        }
    }

    /// Moderators and owners may act on other members' messages.
    pub fn can_moderate(&self) -> bool {
        matches!(self, Self::Moderator | Self::Owner)
    }
}

impl FromStr for RoomRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "moderator" => Ok(Self::Moderator),
            "owner" => Ok(Self::Owner),
            other => Err(format!("unknown room role '{}'", other)),
        }
    }
}

/// Membership lookup.
///
/// Both methods fail with `StoreError::RoomNotFound` when the room does not
/// exist, so callers can tell "no such room" from "not a member".
#[async_trait]
pub trait RoomMembership: Send + Sync {
    /// The user's role in the room, or `None` if they are not a member.
    async fn role(&self, room_id: RoomId, user_id: UserId) -> Result<Option<RoomRole>, StoreError>;

    /// Check if the user is a member of the room.
    async fn is_member(&self, room_id: RoomId, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.role(room_id, user_id).await?.is_some())
    }
}
