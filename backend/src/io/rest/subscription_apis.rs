//! # REST API for Subscription Management
//!
//! Endpoints for creating, retrieving, updating, and deleting the caller's
//! recurring expenses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{SubscriptionListResponse, SubscriptionRequest};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error_response;
use crate::AppState;

/// List the caller's subscriptions, soonest renewal first
pub async fn list_subscriptions(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    info!("GET /api/subscriptions - user: {}", auth.user_id);

    match state.subscription_service.list(&auth.user_id).await {
        Ok(subscriptions) => (StatusCode::OK, Json(SubscriptionListResponse { subscriptions })).into_response(),
        Err(e) => error_response("list subscriptions", e),
    }
}

/// Create a subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SubscriptionRequest>,
) -> impl IntoResponse {
    info!("POST /api/subscriptions - user: {}, request: {:?}", auth.user_id, request);

    match state.subscription_service.create(&auth.user_id, request).await {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(e) => error_response("create subscription", e),
    }
}

/// Get one subscription by ID
pub async fn get_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/subscriptions/{}", subscription_id);

    match state.subscription_service.get(&auth.user_id, &subscription_id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(e) => error_response("get subscription", e),
    }
}

/// Replace a subscription's editable fields
pub async fn update_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
    Json(request): Json<SubscriptionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/subscriptions/{} - request: {:?}", subscription_id, request);

    match state
        .subscription_service
        .update(&auth.user_id, &subscription_id, request)
        .await
    {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(e) => error_response("update subscription", e),
    }
}

/// Delete a subscription
pub async fn delete_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(subscription_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/subscriptions/{}", subscription_id);

    match state.subscription_service.delete(&auth.user_id, &subscription_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete subscription", e),
    }
}
