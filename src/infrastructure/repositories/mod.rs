//! Repository Implementations
//!
//! PostgreSQL implementations of the domain store traits.
//!
//! ## Available Repositories
//!
//! - **PgUserStore** - `CredentialStore` and `PresenceStore` over `users`
//! - **PgMessageStore** - `MessageStore` over `messages` and `message_read_cursors`
//! - **PgRoomMembership** - `RoomMembership` over `rooms` and `room_members`
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{PgMessageStore, PgRoomMembership, PgUserStore};
//!
//! fn setup_stores(pool: PgPool, ids: Arc<SnowflakeGenerator>) {
//!     let users = PgUserStore::new(pool.clone());
//!     let rooms = PgRoomMembership::new(pool.clone());
//!     let messages = PgMessageStore::new(pool, ids);
//! }
//! ```

pub mod message_repository;
pub mod room_repository;
pub mod user_repository;

pub use message_repository::PgMessageStore;
pub use room_repository::PgRoomMembership;
pub use user_repository::PgUserStore;
