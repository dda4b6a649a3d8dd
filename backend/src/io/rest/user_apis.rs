//! # REST API for Accounts and Sessions

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{LoginRequest, RegisterUserRequest};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error_response;
use crate::AppState;

/// Register a new account
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> impl IntoResponse {
    info!("POST /api/users - request: {:?}", request);

    match state.user_service.register(request).await {
        Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
        Err(e) => error_response("register user", e),
    }
}

/// Log in and receive a bearer token
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/sessions - request: {:?}", request);

    match state.user_service.login(request).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => error_response("log in", e),
    }
}

/// Log out the current session
pub async fn delete_session(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    info!("DELETE /api/sessions - user: {}", auth.user_id);

    match state.user_service.logout(&auth.token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("log out", e),
    }
}
