//! # Scheduled Reminder Trigger
//!
//! Called once a day by an external scheduler. The caller proves itself with
//! `Authorization: Bearer <CRON_SECRET>`.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared::{ErrorResponse, SweepResponse};
use tracing::{error, info, warn};

use crate::io::rest::auth::{bearer_token, unauthorized};
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

const TAG_LABEL: &[u8] = b"remindme-cron-trigger";

/// The configured trigger secret.
///
/// Secrets are compared through HMAC tags so the check takes the same time
/// wherever the first mismatching byte is.
#[derive(Clone)]
pub struct CronSecret {
    expected_tag: Vec<u8>,
}

impl CronSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            expected_tag: tag_for(secret.as_bytes()),
        }
    }

    pub fn verify(&self, presented: &str) -> bool {
        let mut mac = match HmacSha256::new_from_slice(presented.as_bytes()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        mac.update(TAG_LABEL);
        mac.verify_slice(&self.expected_tag).is_ok()
    }
}

fn tag_for(key: &[u8]) -> Vec<u8> {
    match HmacSha256::new_from_slice(key) {
        Ok(mut mac) => {
            mac.update(TAG_LABEL);
            mac.finalize().into_bytes().to_vec()
        }
        // HMAC accepts keys of any length
        Err(_) => Vec::new(),
    }
}

/// Run today's reminder sweep
pub async fn run_reminders(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    info!("GET /api/cron/reminders");

    let authorized = match (&state.cron_secret, bearer_token(&headers)) {
        (Some(secret), Some(presented)) => secret.verify(&presented),
        (None, _) => {
            warn!("Reminder trigger called but no CRON_SECRET is configured");
            false
        }
        (Some(_), None) => false,
    };
    if !authorized {
        warn!("Rejected unauthorized reminder trigger");
        return unauthorized();
    }

    let today = state.clock.today();
    match state.reminder_sweep.run_sweep(today).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SweepResponse {
                success: true,
                emails_sent: outcome.emails_sent,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Reminder sweep failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new("Internal Error"))).into_response()
        }
    }
}
