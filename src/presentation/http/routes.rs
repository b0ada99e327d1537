//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{auth_middleware, create_cors_layer, create_trace_layer};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .layer(create_cors_layer(&state.settings.cors))
        .layer(create_trace_layer())
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/users", user_routes(state.clone()))
        .nest("/rooms", room_routes(state))
}

/// Authentication routes (register and login are public)
fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(protected)
}

/// User routes (protected)
fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/@me", get(handlers::user::get_current_user))
        .route("/{user_id}", get(handlers::user::get_user))
        .route("/{user_id}/status", put(handlers::user::update_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Room message routes (protected)
fn room_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/{room_id}/messages",
            get(handlers::message::get_messages).post(handlers::message::send_message),
        )
        .route(
            "/{room_id}/messages/unread",
            get(handlers::message::get_unread_messages),
        )
        .route(
            "/{room_id}/messages/{message_id}",
            get(handlers::message::get_message)
                .patch(handlers::message::edit_message)
                .delete(handlers::message::delete_message),
        )
        .route(
            "/{room_id}/messages/{message_id}/ack",
            post(handlers::message::ack_message),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
