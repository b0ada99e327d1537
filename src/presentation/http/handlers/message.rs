//! Message Handlers

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::application::dto::request::{
    EditMessageRequest, MessageQueryParams, SendMessageRequest, UnreadQueryParams,
};
use crate::application::dto::response::{MessageResponse, ReadCursorResponse};
use crate::presentation::http::error::{parse_id, ApiError};
use crate::presentation::http::extractors::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// Message query parameters; IDs arrive as strings like everywhere else
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub before: Option<String>,
    pub after: Option<String>,
    pub limit: Option<u32>,
}

impl MessageQuery {
    fn into_params(self) -> Result<MessageQueryParams, ApiError> {
        Ok(MessageQueryParams {
            before: self.before.as_deref().map(|s| parse_id(s, "message")).transpose()?,
            after: self.after.as_deref().map(|s| parse_id(s, "message")).transpose()?,
            limit: self.limit,
        })
    }
}

fn message_list(messages: Vec<crate::domain::Message>) -> Json<Vec<MessageResponse>> {
    Json(messages.into_iter().map(MessageResponse::from).collect())
}

/// Send a message to a room
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(room_id): ApiPath<String>,
    ApiJson(body): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let message = state.chat.send_message(&auth_user, room_id, body).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Get messages from a room, oldest first
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(room_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<MessageQuery>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let messages = state
        .chat
        .list_messages(&auth_user, room_id, query.into_params()?)
        .await?;
    Ok(message_list(messages))
}

/// Get messages after the caller's read cursor
pub async fn get_unread_messages(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(room_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<UnreadQueryParams>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let messages = state
        .chat
        .get_unread_messages(&auth_user, room_id, query.limit)
        .await?;
    Ok(message_list(messages))
}

/// Get a single message
pub async fn get_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((room_id, message_id)): ApiPath<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let message_id = parse_id(&message_id, "message")?;
    let message = state.chat.get_message(&auth_user, room_id, message_id).await?;
    Ok(Json(MessageResponse::from(message)))
}

/// Edit own message
pub async fn edit_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((room_id, message_id)): ApiPath<(String, String)>,
    ApiJson(body): ApiJson<EditMessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let message_id = parse_id(&message_id, "message")?;
    let message = state
        .chat
        .edit_message(&auth_user, room_id, message_id, &body.content)
        .await?;
    Ok(Json(MessageResponse::from(message)))
}

/// Delete a message
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((room_id, message_id)): ApiPath<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let message_id = parse_id(&message_id, "message")?;
    state
        .chat
        .delete_message(&auth_user, room_id, message_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a message (and everything before it) as read
pub async fn ack_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((room_id, message_id)): ApiPath<(String, String)>,
) -> Result<Json<ReadCursorResponse>, ApiError> {
    let room_id = parse_id(&room_id, "room")?;
    let message_id = parse_id(&message_id, "message")?;
    let cursor = state
        .chat
        .mark_as_read(&auth_user, room_id, message_id)
        .await?;
    Ok(Json(ReadCursorResponse::from(cursor)))
}
