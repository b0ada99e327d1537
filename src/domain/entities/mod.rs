//! # Domain Entities
//!
//! Core domain entities and the store traits through which they persist.
//!
//! - **User**: account, credentials (via `CredentialStore`) and presence
//!   (via `PresenceStore`)
//! - **Room**: authorization scope for messages (read through `RoomMembership`)
//! - **Message**: a room-scoped message and its read cursors (via `MessageStore`)
//!
//! Store traits are defined here and implemented in the infrastructure layer,
//! following the dependency inversion principle.

mod message;
mod room;
mod user;

/// Snowflake user ID.
pub type UserId = i64;

/// Room ID as assigned by the room administration system.
pub type RoomId = i64;

/// Snowflake message ID.
pub type MessageId = i64;

pub use user::{
    CredentialStore, PresenceOutcome, PresenceStore, PresenceUpdate, UnknownStatus, User,
    UserStatus,
};

pub use room::{Room, RoomMembership, RoomRole};

pub use message::{
    Message, MessageStore, MessageType, MessageWindow, NewMessage, ReadCursor,
};
