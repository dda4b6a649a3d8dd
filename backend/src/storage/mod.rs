//! # Storage Module
//!
//! Persistence for users, sessions, subscriptions and incomes.
//!
//! The domain layer only sees the traits in [`traits`]; the SQLite
//! repositories in [`repositories`] are wired in by `initialize_backend`.
//! Money is stored as decimal TEXT and dates as `YYYY-MM-DD` TEXT so nothing
//! is lost to floating point and ISO dates still sort correctly.

pub mod connection;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{IncomeRepository, SubscriptionRepository, UserRepository};
pub use traits::{IncomeStorage, SubscriptionStorage, UserStorage};
