//! # REST API for the Budget Summary

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use shared::BudgetPeriod;
use tracing::info;

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error_response;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub view: BudgetPeriod,
}

/// Income, expense and remaining totals for the caller, rounded to cents
pub async fn get_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    info!("GET /api/summary - user: {}, view: {:?}", auth.user_id, query.view);

    match state.budget_service.summary_for_user(&auth.user_id, query.view).await {
        Ok(view) => (StatusCode::OK, Json(view.rounded())).into_response(),
        Err(e) => error_response("build budget summary", e),
    }
}
