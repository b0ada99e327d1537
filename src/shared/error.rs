//! Error Types
//!
//! Typed failures for the store layer and the use-case layer. Transport
//! status codes are deliberately absent here; see `presentation::http::error`.

use std::fmt;

use crate::domain::RoomId;

/// Field on which a uniqueness constraint was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by a persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    #[error("room {0} does not exist")]
    RoomNotFound(RoomId),

    #[error("record not found")]
    NotFound,

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Use-case failure taxonomy.
///
/// Everything except `Internal` is a domain failure caused by the request.
/// `Internal` means the system is unhealthy and carries a diagnostic that must
/// not be shown to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} already exists")]
    AlreadyExists(UniqueField),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Shorthand for `InvalidArgument`.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// True for infrastructure failures, false for domain failures.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// Default translation for store failures.
///
/// `NotFound` has no generic meaning, so call sites that expect it match on it
/// before falling back to this conversion.
impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(field) => ServiceError::AlreadyExists(field),
            StoreError::RoomNotFound(_) => ServiceError::RoomNotFound,
            StoreError::NotFound => ServiceError::Internal("record vanished during operation".into()),
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}
