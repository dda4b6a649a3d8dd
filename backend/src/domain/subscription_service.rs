//! Subscription service: validated, owner-scoped CRUD over a user's expenses.
//!
//! Every operation takes the caller's user id and never touches another
//! user's records. A record that exists but belongs to someone else is
//! reported exactly like one that does not exist.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use shared::{ExpenseType, Frequency, Subscription, SubscriptionRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::storage::SubscriptionStorage;

pub(crate) const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_REMINDER_DAYS: i64 = 3;

/// Request fields after validation
struct ValidSubscription {
    name: String,
    price: Decimal,
    currency: String,
    frequency: Frequency,
    expense_type: ExpenseType,
    start_date: NaiveDate,
    next_renewal: NaiveDate,
    reminder_days: u32,
    send_email: bool,
    is_active: bool,
}

#[derive(Clone)]
pub struct SubscriptionService {
    storage: Arc<dyn SubscriptionStorage>,
}

impl SubscriptionService {
    pub fn new(storage: Arc<dyn SubscriptionStorage>) -> Self {
        Self { storage }
    }

    /// The user's subscriptions, soonest renewal first
    pub async fn list(&self, user_id: &str) -> DomainResult<Vec<Subscription>> {
        Ok(self.storage.list_subscriptions(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, subscription_id: &str) -> DomainResult<Subscription> {
        self.storage
            .get_subscription(user_id, subscription_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Subscription".to_string()))
    }

    pub async fn create(&self, user_id: &str, request: SubscriptionRequest) -> DomainResult<Subscription> {
        let valid = validate(&request)?;
        let now = Utc::now().to_rfc3339();

        let subscription = Subscription {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: valid.name,
            price: valid.price,
            currency: valid.currency,
            frequency: valid.frequency,
            expense_type: valid.expense_type,
            start_date: valid.start_date,
            next_renewal: valid.next_renewal,
            reminder_days: valid.reminder_days,
            send_email: valid.send_email,
            is_active: valid.is_active,
            created_at: now.clone(),
            updated_at: now,
        };

        self.storage.store_subscription(&subscription).await?;
        info!("Created subscription {} for user {}", subscription.id, user_id);
        Ok(subscription)
    }

    pub async fn update(
        &self,
        user_id: &str,
        subscription_id: &str,
        request: SubscriptionRequest,
    ) -> DomainResult<Subscription> {
        let valid = validate(&request)?;
        let existing = self.get(user_id, subscription_id).await?;

        let updated = Subscription {
            name: valid.name,
            price: valid.price,
            currency: valid.currency,
            frequency: valid.frequency,
            expense_type: valid.expense_type,
            start_date: valid.start_date,
            next_renewal: valid.next_renewal,
            reminder_days: valid.reminder_days,
            send_email: valid.send_email,
            is_active: valid.is_active,
            updated_at: Utc::now().to_rfc3339(),
            ..existing
        };

        // Deleted between the read and the write
        if self.storage.update_subscription(&updated).await? == 0 {
            return Err(DomainError::NotFound("Subscription".to_string()));
        }
        info!("Updated subscription {} for user {}", subscription_id, user_id);
        Ok(updated)
    }

    pub async fn delete(&self, user_id: &str, subscription_id: &str) -> DomainResult<()> {
        if self.storage.delete_subscription(user_id, subscription_id).await? == 0 {
            return Err(DomainError::NotFound("Subscription".to_string()));
        }
        info!("Deleted subscription {} for user {}", subscription_id, user_id);
        Ok(())
    }
}

fn validate(request: &SubscriptionRequest) -> DomainResult<ValidSubscription> {
    let mut v = Validator::new();

    let name = request.name.trim().to_string();
    v.check(!name.is_empty(), "name", "Name is required");
    v.check(request.price >= Decimal::ZERO, "price", "Price must be positive");

    let currency = normalize_currency(request.currency.as_deref(), &mut v);

    let frequency = Frequency::parse_known(&request.frequency);
    v.check(frequency.is_some(), "frequency", "Frequency must be MONTHLY or YEARLY");

    let expense_type = match request.expense_type.as_deref() {
        None => Some(ExpenseType::default()),
        Some(raw) => ExpenseType::parse(raw),
    };
    v.check(
        expense_type.is_some(),
        "type",
        "Type must be SUBSCRIPTION, BILL or YEARLY_EXPENSE",
    );

    let start_date = parse_date(&request.start_date);
    v.check(start_date.is_some(), "start_date", "Start date must be a YYYY-MM-DD date");
    let next_renewal = parse_date(&request.next_renewal);
    v.check(next_renewal.is_some(), "next_renewal", "Next renewal must be a YYYY-MM-DD date");

    let reminder_days = u32::try_from(request.reminder_days.unwrap_or(DEFAULT_REMINDER_DAYS)).ok();
    v.check(reminder_days.is_some(), "reminder_days", "Reminder days must be zero or more");

    v.finish()?;

    match (frequency, expense_type, start_date, next_renewal, reminder_days) {
        (Some(frequency), Some(expense_type), Some(start_date), Some(next_renewal), Some(reminder_days)) => {
            Ok(ValidSubscription {
                name,
                price: request.price,
                currency,
                frequency,
                expense_type,
                start_date,
                next_renewal,
                reminder_days,
                send_email: request.send_email.unwrap_or(true),
                is_active: request.is_active.unwrap_or(true),
            })
        }
        _ => Err(DomainError::Validation(Default::default())),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Upper-cased ISO 4217 style code, `USD` when absent
pub(crate) fn normalize_currency(raw: Option<&str>, v: &mut Validator) -> String {
    let currency = raw
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_ascii_uppercase();
    v.check(
        currency.len() == 3 && currency.chars().all(|c| c.is_ascii_alphabetic()),
        "currency",
        "Currency must be a 3-letter code",
    );
    currency
}
