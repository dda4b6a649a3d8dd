use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{Frequency, Income};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

use crate::storage::connection::DbConnection;
use crate::storage::traits::IncomeStorage;

/// Repository for income operations
#[derive(Clone)]
pub struct IncomeRepository {
    db: DbConnection,
}

impl IncomeRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn map_row(row: &SqliteRow) -> Result<Income> {
        let amount: String = row.try_get("amount")?;
        Ok(Income {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            source: row.try_get("source")?,
            amount: Decimal::from_str(&amount)
                .with_context(|| format!("Invalid stored amount: {}", amount))?,
            currency: row.try_get("currency")?,
            frequency: Frequency::from(row.try_get::<String, _>("frequency")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl IncomeStorage for IncomeRepository {
    async fn store_income(&self, income: &Income) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO incomes (id, user_id, source, amount, currency, frequency, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&income.id)
        .bind(&income.user_id)
        .bind(&income.source)
        .bind(income.amount.to_string())
        .bind(&income.currency)
        .bind(income.frequency.as_str())
        .bind(&income.created_at)
        .bind(&income.updated_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_income(&self, user_id: &str, income_id: &str) -> Result<Option<Income>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, source, amount, currency, frequency, created_at, updated_at
            FROM incomes
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(income_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::map_row).transpose()
    }

    async fn list_incomes(&self, user_id: &str) -> Result<Vec<Income>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, source, amount, currency, frequency, created_at, updated_at
            FROM incomes
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut incomes = rows.iter().map(Self::map_row).collect::<Result<Vec<_>>>()?;
        // Amounts are TEXT in SQLite, so order numerically here
        incomes.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.source.cmp(&b.source)));
        Ok(incomes)
    }

    async fn update_income(&self, income: &Income) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE incomes
            SET source = ?, amount = ?, currency = ?, frequency = ?, updated_at = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&income.source)
        .bind(income.amount.to_string())
        .bind(&income.currency)
        .bind(income.frequency.as_str())
        .bind(&income.updated_at)
        .bind(&income.id)
        .bind(&income.user_id)
        .execute(self.db.pool())
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_income(&self, user_id: &str, income_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM incomes WHERE id = ? AND user_id = ?")
            .bind(income_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }
}
