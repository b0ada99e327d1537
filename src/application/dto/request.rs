//! Request DTOs
//!
//! Inputs of the use cases. Field rules are declared with `validator` and
//! checked by the services themselves, so every transport gets the same
//! validation.

use serde::Deserialize;
use validator::Validate;

use crate::domain::MessageId;
use crate::shared::validation::{validate_password_strength, validate_username};

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(url(message = "Invalid avatar URL"))]
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Login request
///
/// `identifier` is an email when it contains `@`, a username otherwise.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    #[validate(length(min = 1, message = "Identifier is required"))]
    pub identifier: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Status update request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Send message request
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,

    /// `text`, `image` or `file`; defaults to `text`
    #[serde(default, rename = "type")]
    pub message_type: Option<String>,
}

/// Edit message request
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

/// Message query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct MessageQueryParams {
    pub before: Option<MessageId>,
    pub after: Option<MessageId>,
    pub limit: Option<u32>,
}

/// Unread messages query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UnreadQueryParams {
    pub limit: Option<u32>,
}
