//! Normalizes recurring amounts to a per-month figure.
//!
//! Only the monthly figure is canonical; the yearly one is always derived
//! from it.

use rust_decimal::Decimal;
use shared::Frequency;
use tracing::warn;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Per-month value of `amount` billed at `frequency`.
///
/// Unrecognized frequencies contribute nothing.
pub fn to_monthly(amount: Decimal, frequency: &Frequency) -> Decimal {
    match frequency {
        Frequency::Monthly => amount,
        Frequency::Yearly => amount / MONTHS_PER_YEAR,
        Frequency::Unrecognized(tag) => {
            warn!("Unrecognized frequency '{}', treating amount {} as zero", tag, amount);
            Decimal::ZERO
        }
    }
}

/// Per-year value of `amount` billed at `frequency`
pub fn to_yearly(amount: Decimal, frequency: &Frequency) -> Decimal {
    to_monthly(amount, frequency) * MONTHS_PER_YEAR
}
