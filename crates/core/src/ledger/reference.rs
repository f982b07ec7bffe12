//! Reference numbers for generated transactions.

use chrono::NaiveDate;
use uuid::Uuid;

/// Prefix for safedrop resolution transfers.
pub const SAFEDROP_PREFIX: &str = "SR";

/// Prefix for loan payment mirrors.
pub const LOAN_PAYMENT_PREFIX: &str = "LP";

/// Builds `{prefix}-{YYYYMMDD}-{8 hex}` from the given entropy.
#[must_use]
pub fn reference_number(prefix: &str, date: NaiveDate, entropy: Uuid) -> String {
    let hex = entropy.simple().to_string();
    format!("{prefix}-{}-{}", date.format("%Y%m%d"), &hex[..8])
}

/// Builds a reference number with fresh random entropy.
#[must_use]
pub fn generate_reference(prefix: &str, date: NaiveDate) -> String {
    reference_number(prefix, date, Uuid::new_v4())
}
