//! User Handlers

use axum::{
    extract::{Extension, State},
    Json,
};

use crate::application::dto::request::UpdateStatusRequest;
use crate::application::dto::response::{StatusResponse, UserResponse};
use crate::presentation::http::error::{parse_id, ApiError};
use crate::presentation::http::extractors::{ApiJson, ApiPath};
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// Get current authenticated user
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.get_user(auth_user.user_id).await?;
    Ok(Json(UserResponse::from_user(user, true)))
}

/// Get user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let user = state.users.get_user(user_id).await?;

    // Email is private to its owner
    let include_email = user.id == auth_user.user_id;
    Ok(Json(UserResponse::from_user(user, include_email)))
}

/// Update a user's presence status (self only)
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    let ack = state
        .users
        .update_status(&auth_user, user_id, &body.status)
        .await?;
    Ok(Json(StatusResponse::from(ack)))
}
