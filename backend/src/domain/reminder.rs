//! Decides whether a renewing item should trigger its reminder on a given day.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// The calendar date on which the reminder for a renewal should go out.
///
/// `None` when the subtraction leaves the representable date range.
pub fn reminder_date(next_renewal: NaiveDate, reminder_days: u32) -> Option<NaiveDate> {
    next_renewal.checked_sub_days(Days::new(u64::from(reminder_days)))
}

/// True exactly when `today` is `reminder_days` calendar days before `next_renewal`
pub fn is_due_today(next_renewal: NaiveDate, reminder_days: u32, today: NaiveDate) -> bool {
    reminder_date(next_renewal, reminder_days) == Some(today)
}

/// Like [`is_due_today`] but takes an instant, truncated to its UTC calendar date
pub fn is_due_at(next_renewal: NaiveDate, reminder_days: u32, now: DateTime<Utc>) -> bool {
    is_due_today(next_renewal, reminder_days, now.date_naive())
}
