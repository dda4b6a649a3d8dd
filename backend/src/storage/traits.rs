//! # Storage Traits
//!
//! Storage abstractions consumed by the domain layer. Services hold these as
//! `Arc<dyn …>` so tests can swap in fakes and production uses SQLite.

use anyhow::Result;
use async_trait::async_trait;
use shared::{Income, Subscription};

use crate::domain::models::{ReminderCandidate, SessionRecord, UserRecord};

/// Expense storage. Every per-record operation is scoped by owner.
#[async_trait]
pub trait SubscriptionStorage: Send + Sync {
    /// Store a new subscription
    async fn store_subscription(&self, subscription: &Subscription) -> Result<()>;

    /// Retrieve a subscription by ID, only if `user_id` owns it
    async fn get_subscription(&self, user_id: &str, subscription_id: &str) -> Result<Option<Subscription>>;

    /// List a user's subscriptions ordered by next renewal date (soonest first)
    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>>;

    /// Replace the editable fields of a subscription owned by `subscription.user_id`.
    /// Returns the number of rows affected; 0 means not found or not owned.
    async fn update_subscription(&self, subscription: &Subscription) -> Result<u64>;

    /// Delete a subscription owned by `user_id`.
    /// Returns the number of rows affected; 0 means not found or not owned.
    async fn delete_subscription(&self, user_id: &str, subscription_id: &str) -> Result<u64>;

    /// Every active subscription across all users, joined with owner contact info
    async fn list_active_with_owner(&self) -> Result<Vec<ReminderCandidate>>;
}

/// Income storage, scoped by owner like [`SubscriptionStorage`]
#[async_trait]
pub trait IncomeStorage: Send + Sync {
    async fn store_income(&self, income: &Income) -> Result<()>;

    async fn get_income(&self, user_id: &str, income_id: &str) -> Result<Option<Income>>;

    /// List a user's incomes ordered by amount, largest first
    async fn list_incomes(&self, user_id: &str) -> Result<Vec<Income>>;

    async fn update_income(&self, income: &Income) -> Result<u64>;

    async fn delete_income(&self, user_id: &str, income_id: &str) -> Result<u64>;
}

/// User and session storage
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn store_user(&self, user: &UserRecord) -> Result<()>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Look up a user by email (case-insensitive)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Delete a user; subscriptions, incomes and sessions cascade
    async fn delete_user(&self, user_id: &str) -> Result<u64>;

    async fn store_session(&self, session: &SessionRecord) -> Result<()>;

    async fn get_session(&self, token_hash: &str) -> Result<Option<SessionRecord>>;

    async fn delete_session(&self, token_hash: &str) -> Result<u64>;
}
