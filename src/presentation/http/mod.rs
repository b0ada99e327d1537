//! HTTP API
//!
//! REST endpoints under `/api/v1`.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::ApiError;
pub use routes::create_router;
