use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field name -> human readable messages, returned with validation failures
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Billing frequency of a recurring item.
///
/// Stored and transmitted as `MONTHLY` / `YEARLY`. Anything else read back from
/// storage is kept verbatim as `Unrecognized` rather than failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
    Unrecognized(String),
}

impl Frequency {
    /// Parse one of the known tags (case-insensitive). Returns `None` for anything else.
    pub fn parse_known(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MONTHLY" => Some(Frequency::Monthly),
            "YEARLY" => Some(Frequency::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
            Frequency::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for Frequency {
    fn from(raw: String) -> Self {
        Frequency::parse_known(&raw).unwrap_or(Frequency::Unrecognized(raw))
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category tag for an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    #[default]
    Subscription,
    /// Recurring bill such as rent
    Bill,
    /// Once-a-year charge such as a tax
    YearlyExpense,
}

impl ExpenseType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUBSCRIPTION" => Some(ExpenseType::Subscription),
            "BILL" => Some(ExpenseType::Bill),
            "YEARLY_EXPENSE" => Some(ExpenseType::YearlyExpense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Subscription => "SUBSCRIPTION",
            ExpenseType::Bill => "BILL",
            ExpenseType::YearlyExpense => "YEARLY_EXPENSE",
        }
    }
}

/// A recurring expense owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    /// ID of the user this expense belongs to
    pub user_id: String,
    /// Display name, e.g. "Netflix" or "Rent"
    pub name: String,
    /// Cost per billing period, always non-negative
    pub price: Decimal,
    /// ISO 4217 currency code
    pub currency: String,
    pub frequency: Frequency,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub start_date: NaiveDate,
    pub next_renewal: NaiveDate,
    /// How many days before `next_renewal` the reminder goes out
    pub reminder_days: u32,
    pub send_email: bool,
    pub is_active: bool,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339
    pub updated_at: String,
}

/// A recurring income source owned by a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub user_id: String,
    /// Where the money comes from, e.g. "Salary"
    pub source: String,
    pub amount: Decimal,
    pub currency: String,
    pub frequency: Frequency,
    pub created_at: String,
    pub updated_at: String,
}

/// A registered user, safe to return to clients (no password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

/// Period a budget summary is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Yearly,
}

/// Income / expense / remaining totals for one user, derived on demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetView {
    pub view: BudgetPeriod,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub remaining: Decimal,
}

impl BudgetView {
    pub fn zero(view: BudgetPeriod) -> Self {
        Self {
            view,
            total_income: Decimal::ZERO,
            total_expense: Decimal::ZERO,
            remaining: Decimal::ZERO,
        }
    }

    /// Round every total to whole cents for display
    pub fn rounded(&self) -> Self {
        Self {
            view: self.view,
            total_income: self.total_income.round_dp(2),
            total_expense: self.total_expense.round_dp(2),
            remaining: self.remaining.round_dp(2),
        }
    }
}

/// Body for creating or updating an expense.
///
/// Dates and tags arrive as strings so that malformed values can be reported
/// per field instead of rejecting the whole body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub frequency: String,
    #[serde(rename = "type", default)]
    pub expense_type: Option<String>,
    /// YYYY-MM-DD
    pub start_date: String,
    /// YYYY-MM-DD
    pub next_renewal: String,
    #[serde(default)]
    pub reminder_days: Option<i64>,
    #[serde(default)]
    pub send_email: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<Subscription>,
}

/// Body for creating or updating an income source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRequest {
    pub source: String,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeListResponse {
    pub incomes: Vec<Income>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterUserRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Issued on login. `token` goes into `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    /// RFC 3339
    pub expires_at: String,
}

/// Result of one reminder sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResponse {
    pub success: bool,
    pub emails_sent: u32,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_frequency_parse_known_is_case_insensitive() {
        assert_eq!(Frequency::parse_known("MONTHLY"), Some(Frequency::Monthly));
        assert_eq!(Frequency::parse_known(" yearly "), Some(Frequency::Yearly));
        assert_eq!(Frequency::parse_known("weekly"), None);
    }

    #[test]
    fn test_frequency_keeps_unrecognized_tag() {
        let frequency = Frequency::from("WEEKLY".to_string());
        assert_eq!(frequency, Frequency::Unrecognized("WEEKLY".to_string()));
        assert_eq!(frequency.as_str(), "WEEKLY");
    }

    #[test]
    fn test_frequency_serde_uses_plain_strings() {
        let json = serde_json::to_string(&Frequency::Yearly).unwrap();
        assert_eq!(json, "\"YEARLY\"");

        let parsed: Frequency = serde_json::from_str("\"QUARTERLY\"").unwrap();
        assert_eq!(parsed, Frequency::Unrecognized("QUARTERLY".to_string()));
    }

    #[test]
    fn test_expense_type_parse() {
        assert_eq!(ExpenseType::parse("bill"), Some(ExpenseType::Bill));
        assert_eq!(ExpenseType::parse("YEARLY_EXPENSE"), Some(ExpenseType::YearlyExpense));
        assert_eq!(ExpenseType::parse("gift"), None);
        assert_eq!(ExpenseType::default().as_str(), "SUBSCRIPTION");
    }

    #[test]
    fn test_subscription_serializes_type_field() {
        let subscription = Subscription {
            id: "sub-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Rent".to_string(),
            price: Decimal::from_str("1200.00").unwrap(),
            currency: "EUR".to_string(),
            frequency: Frequency::Monthly,
            expense_type: ExpenseType::Bill,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            next_renewal: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            reminder_days: 3,
            send_email: true,
            is_active: true,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&subscription).unwrap();
        assert_eq!(value["type"], "BILL");
        assert_eq!(value["frequency"], "MONTHLY");
        assert_eq!(value["next_renewal"], "2025-03-01");
        assert_eq!(value["price"], "1200.00");
    }

    #[test]
    fn test_subscription_request_defaults() {
        let request: SubscriptionRequest = serde_json::from_str(
            r#"{
                "name": "Spotify",
                "price": 9.99,
                "frequency": "MONTHLY",
                "start_date": "2024-05-01",
                "next_renewal": "2025-05-01"
            }"#,
        )
        .unwrap();

        assert_eq!(request.price, Decimal::from_str("9.99").unwrap());
        assert!(request.currency.is_none());
        assert!(request.expense_type.is_none());
        assert!(request.reminder_days.is_none());
        assert!(request.send_email.is_none());
    }

    #[test]
    fn test_budget_view_rounded() {
        let view = BudgetView {
            view: BudgetPeriod::Monthly,
            total_income: Decimal::from_str("100.005").unwrap(),
            total_expense: Decimal::from_str("8.3333333").unwrap(),
            remaining: Decimal::from_str("91.6716667").unwrap(),
        };

        let rounded = view.rounded();
        assert_eq!(rounded.total_expense, Decimal::from_str("8.33").unwrap());
        assert_eq!(rounded.remaining, Decimal::from_str("91.67").unwrap());
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "a@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("hunter22"));
    }

    #[test]
    fn test_budget_period_serde() {
        let period: BudgetPeriod = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(period, BudgetPeriod::Yearly);
    }
}
