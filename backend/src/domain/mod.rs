//! # Domain Module
//!
//! Business logic for the reminder service.
//!
//! - [`recurrence`] and [`reminder`] are pure calculations with no I/O.
//! - [`budget_service`] and [`sweep_service`] build on them and read from
//!   storage through the traits in `crate::storage`.
//! - The remaining services implement validated, owner-scoped CRUD and
//!   authentication.
//!
//! Services receive their collaborators explicitly as `Arc<dyn …>` handles.

pub mod budget_service;
pub mod clock;
pub mod email;
pub mod error;
pub mod income_service;
pub mod models;
pub mod recurrence;
pub mod reminder;
pub mod subscription_service;
pub mod sweep_service;
pub mod user_service;

pub use budget_service::BudgetService;
pub use clock::{Clock, SystemClock};
pub use email::{DisabledEmailSender, EmailSender, SmtpEmailSender, SmtpSettings};
pub use error::{DomainError, DomainResult};
pub use income_service::IncomeService;
pub use subscription_service::SubscriptionService;
pub use sweep_service::{ReminderSweep, SweepOutcome};
pub use user_service::UserService;
