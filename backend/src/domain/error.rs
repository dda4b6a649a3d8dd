use shared::FieldErrors;
use thiserror::Error;

/// Errors surfaced by the domain services
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid data: {0:?}")]
    Validation(FieldErrors),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Collects field-level validation messages before failing once
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(message.into());
    }

    /// Record `message` against `field` unless `ok` holds
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn finish(self) -> DomainResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self.errors))
        }
    }
}
