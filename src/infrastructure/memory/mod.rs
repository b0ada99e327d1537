//! In-memory store implementations.
//!
//! Used when `storage.backend = "memory"` and by the test suites. Locks are
//! synchronous (`parking_lot`, `dashmap`) and never held across an `.await`.

mod message_store;
mod room_store;
mod user_store;

pub use message_store::InMemoryMessageStore;
pub use room_store::InMemoryRoomDirectory;
pub use user_store::InMemoryUserStore;
