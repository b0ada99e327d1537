//! Response DTOs
//!
//! Data structures for API response bodies. Snowflake IDs are rendered as
//! strings so JavaScript clients do not lose precision.

use serde::Serialize;

use crate::application::services::{AuthSession, StatusAck};
use crate::domain::{Message, ReadCursor, User};

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub status: String,
    pub last_seen: String,
    pub created_at: String,
}

impl UserResponse {
    /// `include_email` should only be set when the user is the caller.
    pub fn from_user(user: User, include_email: bool) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            email: if include_email { Some(user.email) } else { None },
            avatar_url: user.avatar_url,
            status: user.status.as_str().to_string(),
            last_seen: user.last_seen.to_rfc3339(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Register / login response (user plus token)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.token.token.clone(),
            expires_in: session.token.expires_in(),
            token_type: session.token.token_type.to_string(),
            user: UserResponse::from_user(session.user, true),
        }
    }
}

/// Status update response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub user_id: String,
    pub status: String,
    pub last_seen: String,
    pub applied: bool,
}

impl From<StatusAck> for StatusResponse {
    fn from(ack: StatusAck) -> Self {
        Self {
            user_id: ack.user_id.to_string(),
            status: ack.status.as_str().to_string(),
            last_seen: ack.last_seen.to_rfc3339(),
            applied: ack.applied,
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
    pub is_edited: bool,
    pub edited_at: Option<String>,
    pub created_at: String,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            room_id: message.room_id.to_string(),
            user_id: message.user_id.to_string(),
            username: message.username,
            content: message.content,
            message_type: message.message_type.as_str().to_string(),
            is_edited: message.is_edited,
            edited_at: message.edited_at.map(|t| t.to_rfc3339()),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Read cursor response
#[derive(Debug, Serialize)]
pub struct ReadCursorResponse {
    pub room_id: String,
    pub user_id: String,
    pub last_read_message_id: String,
}

impl From<ReadCursor> for ReadCursorResponse {
    fn from(cursor: ReadCursor) -> Self {
        Self {
            room_id: cursor.room_id.to_string(),
            user_id: cursor.user_id.to_string(),
            last_read_message_id: cursor.last_read_message_id.to_string(),
        }
    }
}
