//! Request Identity
//!
//! The caller of a use case is passed in explicitly. Transports resolve it
//! (for HTTP, from the bearer token) and hand it to the service; nothing is
//! read from ambient request context.

use crate::domain::UserId;

/// The resolved caller of the current call.
pub trait RequestIdentity: Send + Sync {
    /// The caller's user ID, or `None` when the caller is anonymous.
    fn user_id(&self) -> Option<UserId>;
}

impl RequestIdentity for UserId {
    fn user_id(&self) -> Option<UserId> {
        Some(*self)
    }
}

impl RequestIdentity for Option<UserId> {
    fn user_id(&self) -> Option<UserId> {
        *self
    }
}
