//! Income service: owner-scoped CRUD over a user's income sources.

use chrono::Utc;
use rust_decimal::Decimal;
use shared::{Frequency, Income, IncomeRequest};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::error::{DomainError, DomainResult, Validator};
use crate::domain::subscription_service::normalize_currency;
use crate::storage::IncomeStorage;

#[derive(Clone)]
pub struct IncomeService {
    storage: Arc<dyn IncomeStorage>,
}

impl IncomeService {
    pub fn new(storage: Arc<dyn IncomeStorage>) -> Self {
        Self { storage }
    }

    /// The user's incomes, largest amount first
    pub async fn list(&self, user_id: &str) -> DomainResult<Vec<Income>> {
        Ok(self.storage.list_incomes(user_id).await?)
    }

    pub async fn get(&self, user_id: &str, income_id: &str) -> DomainResult<Income> {
        self.storage
            .get_income(user_id, income_id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Income".to_string()))
    }

    pub async fn create(&self, user_id: &str, request: IncomeRequest) -> DomainResult<Income> {
        let (source, amount, currency, frequency) = validate(&request)?;
        let now = Utc::now().to_rfc3339();

        let income = Income {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            source,
            amount,
            currency,
            frequency,
            created_at: now.clone(),
            updated_at: now,
        };

        self.storage.store_income(&income).await?;
        info!("Created income {} for user {}", income.id, user_id);
        Ok(income)
    }

    pub async fn update(&self, user_id: &str, income_id: &str, request: IncomeRequest) -> DomainResult<Income> {
        let (source, amount, currency, frequency) = validate(&request)?;
        let existing = self.get(user_id, income_id).await?;

        let updated = Income {
            source,
            amount,
            currency,
            frequency,
            updated_at: Utc::now().to_rfc3339(),
            ..existing
        };

        if self.storage.update_income(&updated).await? == 0 {
            return Err(DomainError::NotFound("Income".to_string()));
        }
        info!("Updated income {} for user {}", income_id, user_id);
        Ok(updated)
    }

    pub async fn delete(&self, user_id: &str, income_id: &str) -> DomainResult<()> {
        if self.storage.delete_income(user_id, income_id).await? == 0 {
            return Err(DomainError::NotFound("Income".to_string()));
        }
        info!("Deleted income {} for user {}", income_id, user_id);
        Ok(())
    }
}

fn validate(request: &IncomeRequest) -> DomainResult<(String, Decimal, String, Frequency)> {
    let mut v = Validator::new();

    let source = request.source.trim().to_string();
    v.check(!source.is_empty(), "source", "Source is required");
    v.check(request.amount >= Decimal::ZERO, "amount", "Amount must be positive");

    let currency = normalize_currency(request.currency.as_deref(), &mut v);

    let frequency = match request.frequency.as_deref() {
        None => Some(Frequency::Monthly),
        Some(raw) => Frequency::parse_known(raw),
    };
    v.check(frequency.is_some(), "frequency", "Frequency must be MONTHLY or YEARLY");

    v.finish()?;
    Ok((source, request.amount, currency, frequency.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repositories::subscription_repository::test_support::insert_user;
    use crate::storage::{DbConnection, IncomeRepository};
    use std::str::FromStr;

    fn request(source: &str, amount: &str) -> IncomeRequest {
        IncomeRequest {
            source: source.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            currency: None,
            frequency: None,
        }
    }

    async fn setup_test() -> IncomeService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        insert_user(&db, "alice", Some("alice@example.com")).await;
        insert_user(&db, "bob", Some("bob@example.com")).await;
        IncomeService::new(Arc::new(IncomeRepository::new(db)))
    }

    #[tokio::test]
    async fn test_create_defaults_to_monthly_usd() {
        let service = setup_test().await;
        let income = service.create("alice", request("Salary", "4000")).await.expect("create failed");

        assert_eq!(income.frequency, Frequency::Monthly);
        assert_eq!(income.currency, "USD");
        assert_eq!(service.list("alice").await.unwrap(), vec![income]);
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let service = setup_test().await;
        let mut bad = request("", "-5");
        bad.frequency = Some("DAILY".to_string());

        match service.create("alice", bad).await {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors["source"], vec!["Source is required"]);
                assert_eq!(errors["amount"], vec!["Amount must be positive"]);
                assert!(errors.contains_key("frequency"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_are_owner_scoped() {
        let service = setup_test().await;
        let income = service.create("alice", request("Salary", "4000")).await.unwrap();

        assert!(matches!(
            service.update("bob", &income.id, request("Salary", "1")).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(service.delete("bob", &income.id).await, Err(DomainError::NotFound(_))));

        let mut raise = request("Salary", "4400");
        raise.frequency = Some("YEARLY".to_string());
        let updated = service.update("alice", &income.id, raise).await.expect("update failed");
        assert_eq!(updated.amount, Decimal::from(4400));
        assert_eq!(updated.frequency, Frequency::Yearly);

        service.delete("alice", &income.id).await.expect("delete failed");
        assert!(matches!(service.get("alice", &income.id).await, Err(DomainError::NotFound(_))));
    }
}
