//! Authentication Handlers

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::AuthResponse;
use crate::presentation::http::error::ApiError;
use crate::presentation::http::extractors::ApiJson;
use crate::presentation::middleware::AuthUser;
use crate::startup::AppState;

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let session = state.auth.register(body).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// Login with username or email
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let session = state.auth.login(body).await?;
    Ok(Json(AuthResponse::from(session)))
}

/// Revoke the token used for this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<StatusCode, ApiError> {
    state.auth.logout(&auth_user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
