//! Currency codes and fixed-point amount validation.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` with at most two decimal places.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places accepted for monetary input.
pub const MONEY_SCALE: u32 = 2;

/// ISO 4217 currency codes supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Canadian Dollar
    Cad,
    /// Euro
    Eur,
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Cad => write!(f, "CAD"),
            Self::Eur => write!(f, "EUR"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "CAD" => Ok(Self::Cad),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Reasons a monetary amount is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Amount is zero or negative.
    #[error("must be greater than zero")]
    NotPositive,
    /// Amount is negative.
    #[error("must not be negative")]
    Negative,
    /// Amount has sub-cent precision.
    #[error("must have at most {MONEY_SCALE} decimal places")]
    TooPrecise,
}

/// Validates a strictly positive amount with cent precision.
pub fn positive_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive);
    }
    cent_precision(amount)
}

/// Validates a zero-or-positive amount with cent precision.
pub fn non_negative_amount(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount < Decimal::ZERO {
        return Err(AmountError::Negative);
    }
    cent_precision(amount)
}

fn cent_precision(amount: Decimal) -> Result<Decimal, AmountError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(AmountError::TooPrecise);
    }
    Ok(amount)
}
