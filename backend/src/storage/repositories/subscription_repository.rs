use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{ExpenseType, Frequency, Subscription};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

use crate::domain::models::ReminderCandidate;
use crate::storage::connection::DbConnection;
use crate::storage::traits::SubscriptionStorage;

const SUBSCRIPTION_COLUMNS: &str = "s.id, s.user_id, s.name, s.price, s.currency, s.frequency, \
     s.expense_type, s.start_date, s.next_renewal, s.reminder_days, s.send_email, s.is_active, \
     s.created_at, s.updated_at";

/// Repository for subscription (expense) operations
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: DbConnection,
}

impl SubscriptionRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Subscription> {
        let price: String = row.try_get("price")?;
        let start_date: String = row.try_get("start_date")?;
        let next_renewal: String = row.try_get("next_renewal")?;
        let expense_type: String = row.try_get("expense_type")?;
        let reminder_days: i64 = row.try_get("reminder_days")?;
        let id: String = row.try_get("id")?;

        let expense_type = ExpenseType::parse(&expense_type).unwrap_or_else(|| {
            warn!(
                "Subscription {} has unknown expense type '{}', reading it as {}",
                id,
                expense_type,
                ExpenseType::default().as_str()
            );
            ExpenseType::default()
        });

        Ok(Subscription {
            id,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            price: Decimal::from_str(&price)
                .with_context(|| format!("Invalid stored price: {}", price))?,
            currency: row.try_get("currency")?,
            frequency: Frequency::from(row.try_get::<String, _>("frequency")?),
            expense_type,
            start_date: parse_date(&start_date)?,
            next_renewal: parse_date(&next_renewal)?,
            reminder_days: u32::try_from(reminder_days)
                .with_context(|| format!("Invalid stored reminder_days: {}", reminder_days))?,
            send_email: row.try_get("send_email")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn map_candidate(row: &SqliteRow) -> Result<ReminderCandidate> {
        Ok(ReminderCandidate {
            subscription: Self::map_row(row)?,
            owner_name: row.try_get("owner_name")?,
            owner_email: row.try_get("owner_email")?,
        })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("Invalid stored date: {}", raw))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl SubscriptionStorage for SubscriptionRepository {
    async fn store_subscription(&self, subscription: &Subscription) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, name, price, currency, frequency, expense_type,
                start_date, next_renewal, reminder_days, send_email, is_active,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscription.id)
        .bind(&subscription.user_id)
        .bind(&subscription.name)
        .bind(subscription.price.to_string())
        .bind(&subscription.currency)
        .bind(subscription.frequency.as_str())
        .bind(subscription.expense_type.as_str())
        .bind(format_date(subscription.start_date))
        .bind(format_date(subscription.next_renewal))
        .bind(i64::from(subscription.reminder_days))
        .bind(subscription.send_email)
        .bind(subscription.is_active)
        .bind(&subscription.created_at)
        .bind(&subscription.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_subscription(&self, user_id: &str, subscription_id: &str) -> Result<Option<Subscription>> {
        let sql = format!(
            "SELECT {} FROM subscriptions s WHERE s.id = ? AND s.user_id = ?",
            SUBSCRIPTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(subscription_id)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>> {
        // ISO dates sort correctly as text
        let sql = format!(
            "SELECT {} FROM subscriptions s WHERE s.user_id = ? ORDER BY s.next_renewal ASC, s.name ASC",
            SUBSCRIPTION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::map_row).collect()
    }

    async fn update_subscription(&self, subscription: &Subscription) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET name = ?, price = ?, currency = ?, frequency = ?, expense_type = ?,
                start_date = ?, next_renewal = ?, reminder_days = ?, send_email = ?,
                is_active = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&subscription.name)
        .bind(subscription.price.to_string())
        .bind(&subscription.currency)
        .bind(subscription.frequency.as_str())
        .bind(subscription.expense_type.as_str())
        .bind(format_date(subscription.start_date))
        .bind(format_date(subscription.next_renewal))
        .bind(i64::from(subscription.reminder_days))
        .bind(subscription.send_email)
        .bind(subscription.is_active)
        .bind(&subscription.updated_at)
        .bind(&subscription.id)
        .bind(&subscription.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_subscription(&self, user_id: &str, subscription_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = ? AND user_id = ?")
            .bind(subscription_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_active_with_owner(&self) -> Result<Vec<ReminderCandidate>> {
        let sql = format!(
            r#"
            SELECT {}, u.name AS owner_name, u.email AS owner_email
            FROM subscriptions s
            JOIN users u ON u.id = s.user_id
            WHERE s.is_active = 1
            ORDER BY s.next_renewal ASC
            "#,
            SUBSCRIPTION_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;

        // An unreadable row is skipped so the rest of the sweep still runs
        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::map_candidate(row) {
                Ok(candidate) => candidates.push(candidate),
                Err(e) => {
                    let id = row.try_get::<String, _>("id").unwrap_or_default();
                    warn!("Skipping unreadable subscription {}: {:#}", id, e);
                }
            }
        }
        Ok(candidates)
    }
}
