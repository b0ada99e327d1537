//! HTTP Error Mapping
//!
//! The only place that knows about status codes. Service failures are mapped
//! here; internal failures are logged and replaced with a generic message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::shared::error::ServiceError;

/// Error returned by handlers and middleware.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed path or query input caught before reaching a service
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    /// HTTP status, application error code and client-facing message.
    fn parts(&self) -> (StatusCode, u16, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            ApiError::Service(err) => {
                let message = err.to_string();
                match err {
                    ServiceError::UserNotFound
                    | ServiceError::RoomNotFound
                    | ServiceError::MessageNotFound => (StatusCode::NOT_FOUND, 10001, message),
                    ServiceError::InvalidCredentials
                    | ServiceError::TokenInvalid
                    | ServiceError::TokenExpired => (StatusCode::UNAUTHORIZED, 10003, message),
                    ServiceError::Unauthorized => (StatusCode::FORBIDDEN, 10004, message),
                    ServiceError::AlreadyExists(_) => (StatusCode::CONFLICT, 10005, message),
                    ServiceError::InvalidArgument(msg) => {
                        (StatusCode::BAD_REQUEST, 10007, msg.clone())
                    }
                    ServiceError::Internal(msg) => {
                        tracing::error!("Internal error: {}", msg);
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            10000,
                            "Internal server error".into(),
                        )
                    }
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, Json(ErrorResponse { code, message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Parse a Snowflake ID from a path or query segment.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {} ID", what)))
}
