//! # REST API Interface Layer
//!
//! HTTP endpoints for the reminder service. Handlers log the request, call a
//! domain service and translate the result; no business rules live here.
//!
//! Every failure body is a [`shared::ErrorResponse`]:
//!
//! | Domain error | Status |
//! |---|---|
//! | `Validation` | 400, `message = "Invalid data"` plus per-field `errors` |
//! | `Unauthorized` | 401 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `Storage` | 500, details only in the log |

pub mod auth;
pub mod cron_apis;
pub mod income_apis;
pub mod subscription_apis;
pub mod summary_apis;
pub mod user_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::{debug, error};

use crate::domain::DomainError;

/// Translate a domain failure into its HTTP response
pub(crate) fn error_response(action: &str, e: DomainError) -> Response {
    match e {
        DomainError::Validation(errors) => {
            debug!("Rejected {}: {:?}", action, errors);
            let body = ErrorResponse {
                message: "Invalid data".to_string(),
                errors: Some(errors),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        DomainError::Unauthorized => auth::unauthorized(),
        DomainError::NotFound(what) => {
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(format!("{} not found", what)))).into_response()
        }
        DomainError::Conflict(message) => (StatusCode::CONFLICT, Json(ErrorResponse::new(message))).into_response(),
        DomainError::Storage(err) => {
            error!("Failed to {}: {:#}", action, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Something went wrong")),
            )
                .into_response()
        }
    }
}

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
