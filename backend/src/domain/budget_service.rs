//! Budget summary: income, expenses and what is left over, per month or per year.

use rust_decimal::Decimal;
use shared::{BudgetPeriod, BudgetView, Income, Subscription};
use std::sync::Arc;
use tracing::debug;

use crate::domain::error::DomainResult;
use crate::domain::recurrence::to_monthly;
use crate::storage::{IncomeStorage, SubscriptionStorage};

/// Sum every expense and income as a monthly figure and derive the remainder.
///
/// The yearly view scales the monthly totals by 12 after summation.
pub fn aggregate(expenses: &[Subscription], incomes: &[Income], view: BudgetPeriod) -> BudgetView {
    let monthly_expense: Decimal = expenses
        .iter()
        .map(|s| to_monthly(s.price, &s.frequency))
        .sum();
    let monthly_income: Decimal = incomes
        .iter()
        .map(|i| to_monthly(i.amount, &i.frequency))
        .sum();

    let factor = match view {
        BudgetPeriod::Monthly => Decimal::ONE,
        BudgetPeriod::Yearly => Decimal::new(12, 0),
    };

    BudgetView {
        view,
        total_income: monthly_income * factor,
        total_expense: monthly_expense * factor,
        remaining: (monthly_income - monthly_expense) * factor,
    }
}

#[derive(Clone)]
pub struct BudgetService {
    subscriptions: Arc<dyn SubscriptionStorage>,
    incomes: Arc<dyn IncomeStorage>,
}

impl BudgetService {
    pub fn new(subscriptions: Arc<dyn SubscriptionStorage>, incomes: Arc<dyn IncomeStorage>) -> Self {
        Self { subscriptions, incomes }
    }

    /// Budget view over everything `user_id` owns, inactive expenses included
    pub async fn summary_for_user(&self, user_id: &str, view: BudgetPeriod) -> DomainResult<BudgetView> {
        let expenses = self.subscriptions.list_subscriptions(user_id).await?;
        let incomes = self.incomes.list_incomes(user_id).await?;
        debug!(
            "Aggregating {} expenses and {} incomes for user {}",
            expenses.len(),
            incomes.len(),
            user_id
        );
        Ok(aggregate(&expenses, &incomes, view))
    }
}
