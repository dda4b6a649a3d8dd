//! Bearer-token authentication for the REST layer.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::debug;

use crate::io::rest::error_response;
use crate::AppState;

/// The caller of an authenticated endpoint.
///
/// Extracting this rejects the request with 401 unless it carries a live
/// session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers) else {
            debug!("Missing bearer token for {}", parts.uri.path());
            return Err(unauthorized());
        };

        match state.user_service.authenticate(&token).await {
            Ok(Some(user_id)) => Ok(AuthUser { user_id, token }),
            Ok(None) => Err(unauthorized()),
            Err(e) => Err(error_response("authenticate session", e)),
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

pub(crate) fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("Unauthorized"))).into_response()
}
