//! Runtime configuration, read from the environment (and `.env` via dotenvy).

use std::net::SocketAddr;
use thiserror::Error;

use crate::domain::email::SmtpSettings;

const DEFAULT_DATABASE_URL: &str = "sqlite:remindme.db";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_EMAIL_FROM: &str = "noreply@example.com";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    /// Shared secret for the reminder trigger; `None` rejects every trigger
    pub cron_secret: Option<String>,
    /// `None` disables outgoing email
    pub smtp: Option<SmtpSettings>,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env is normal outside development
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let smtp = match get("SMTP_HOST") {
            None => None,
            Some(host) => {
                let port = match get("SMTP_PORT") {
                    None => DEFAULT_SMTP_PORT,
                    Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                        key: "SMTP_PORT",
                        value: raw.clone(),
                        reason: e.to_string(),
                    })?,
                };
                Some(SmtpSettings {
                    host,
                    port,
                    username: get("SMTP_USERNAME"),
                    password: get("SMTP_PASSWORD"),
                    from: get("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
                })
            }
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr,
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            cron_secret: get("CRON_SECRET"),
            smtp,
        })
    }
}
