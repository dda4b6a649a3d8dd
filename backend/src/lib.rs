//! # RemindMe Backend
//!
//! Tracks recurring expenses and income per user, summarizes the monthly or
//! yearly budget, and emails a reminder a few days before each expense renews.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (business logic, services)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{
    BudgetService, Clock, DisabledEmailSender, EmailSender, IncomeService, ReminderSweep, SmtpEmailSender,
    SubscriptionService, SystemClock, UserService,
};
use crate::io::rest::cron_apis::CronSecret;
use crate::storage::{DbConnection, IncomeRepository, SubscriptionRepository, UserRepository};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub subscription_service: SubscriptionService,
    pub income_service: IncomeService,
    pub budget_service: BudgetService,
    pub reminder_sweep: ReminderSweep,
    pub clock: Arc<dyn Clock>,
    pub cron_secret: Option<CronSecret>,
}

impl AppState {
    /// Wire every service over one database
    pub fn new(
        db: DbConnection,
        email: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
        cron_secret: Option<CronSecret>,
    ) -> Self {
        let subscriptions = Arc::new(SubscriptionRepository::new(db.clone()));
        let incomes = Arc::new(IncomeRepository::new(db.clone()));
        let users = Arc::new(UserRepository::new(db));

        Self {
            user_service: UserService::new(users, clock.clone()),
            subscription_service: SubscriptionService::new(subscriptions.clone()),
            income_service: IncomeService::new(incomes.clone()),
            budget_service: BudgetService::new(subscriptions.clone(), incomes),
            reminder_sweep: ReminderSweep::new(subscriptions, email),
            clock,
            cron_secret,
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database");
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up email");
    let email: Arc<dyn EmailSender> = match &config.smtp {
        Some(settings) => Arc::new(SmtpEmailSender::new(settings)?),
        None => {
            warn!("SMTP_HOST not set, reminder emails are disabled");
            Arc::new(DisabledEmailSender)
        }
    };

    if config.cron_secret.is_none() {
        warn!("CRON_SECRET not set, the reminder trigger will reject every request");
    }

    info!("Setting up application state");
    Ok(AppState::new(
        db,
        email,
        Arc::new(SystemClock),
        config.cron_secret.as_deref().map(CronSecret::new),
    ))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, cors_origin: &str) -> Result<Router> {
    // CORS setup to allow frontend to make requests
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/users", post(io::register_user))
        .route("/sessions", post(io::create_session).delete(io::delete_session))
        .route("/subscriptions", get(io::list_subscriptions).post(io::create_subscription))
        .route(
            "/subscriptions/:id",
            get(io::get_subscription)
                .put(io::update_subscription)
                .delete(io::delete_subscription),
        )
        .route("/incomes", get(io::list_incomes).post(io::create_income))
        .route(
            "/incomes/:id",
            get(io::get_income).put(io::update_income).delete(io::delete_income),
        )
        .route("/summary", get(io::get_summary))
        .route("/cron/reminders", get(io::run_reminders));

    Ok(Router::new()
        .route("/health", get(io::health))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state))
}
