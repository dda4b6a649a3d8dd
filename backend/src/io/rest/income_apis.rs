//! # REST API for Income Management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use shared::{IncomeListResponse, IncomeRequest};
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error_response;
use crate::AppState;

/// List the caller's incomes, largest first
pub async fn list_incomes(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    info!("GET /api/incomes - user: {}", auth.user_id);

    match state.income_service.list(&auth.user_id).await {
        Ok(incomes) => (StatusCode::OK, Json(IncomeListResponse { incomes })).into_response(),
        Err(e) => error_response("list incomes", e),
    }
}

pub async fn create_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<IncomeRequest>,
) -> impl IntoResponse {
    info!("POST /api/incomes - user: {}, request: {:?}", auth.user_id, request);

    match state.income_service.create(&auth.user_id, request).await {
        Ok(income) => (StatusCode::CREATED, Json(income)).into_response(),
        Err(e) => error_response("create income", e),
    }
}

pub async fn get_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(income_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/incomes/{}", income_id);

    match state.income_service.get(&auth.user_id, &income_id).await {
        Ok(income) => (StatusCode::OK, Json(income)).into_response(),
        Err(e) => error_response("get income", e),
    }
}

pub async fn update_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(income_id): Path<String>,
    Json(request): Json<IncomeRequest>,
) -> impl IntoResponse {
    info!("PUT /api/incomes/{} - request: {:?}", income_id, request);

    match state.income_service.update(&auth.user_id, &income_id, request).await {
        Ok(income) => (StatusCode::OK, Json(income)).into_response(),
        Err(e) => error_response("update income", e),
    }
}

pub async fn delete_income(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(income_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/incomes/{}", income_id);

    match state.income_service.delete(&auth.user_id, &income_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("delete income", e),
    }
}
