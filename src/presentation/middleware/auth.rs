//! Authentication Middleware
//!
//! Resolves the bearer token of protected routes to a caller.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::application::identity::RequestIdentity;
use crate::domain::UserId;
use crate::presentation::http::error::ApiError;
use crate::startup::AppState;

/// Authenticated user extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    /// The presented token, kept for logout
    pub token: String,
}

impl RequestIdentity for AuthUser {
    fn user_id(&self) -> Option<UserId> {
        Some(self.user_id)
    }
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| ApiError::Unauthorized("Missing authorization header".into()))?;

    let token = bearer.token().to_owned();
    let user_id = state.auth.authenticate(&token).await?;

    // Insert authenticated user into request extensions
    request.extensions_mut().insert(AuthUser { user_id, token });

    // Continue to the next handler
    Ok(next.run(request).await)
}
