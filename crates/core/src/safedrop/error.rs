//! Safedrop resolution errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that reject a safedrop resolution before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SafedropError {
    /// Amount is zero or negative.
    #[error("The amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has sub-cent precision.
    #[error("The amount must have at most 2 decimal places")]
    TooPrecise,

    /// Requested amount is larger than what is left to resolve.
    #[error("The amount {requested} exceeds the remaining safedrop amount of {remaining}")]
    OverAllocation {
        /// Amount asked for.
        requested: Decimal,
        /// Amount still unresolved.
        remaining: Decimal,
    },

    /// Target is the cash account itself.
    #[error("Safedrops cannot be resolved into the cash account")]
    TargetIsCash,

    /// Target account is inactive or archived.
    #[error("Account {0} is not available for resolutions")]
    TargetUnavailable(Uuid),

    /// A declared amount below the resolved total would break the allocation invariant.
    #[error("The safedrops amount cannot be lower than the {resolved} already resolved")]
    DeclaredBelowResolved {
        /// Amount already resolved.
        resolved: Decimal,
    },
}

impl SafedropError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount | Self::TooPrecise | Self::OverAllocation { .. } => "amount",
            Self::TargetIsCash | Self::TargetUnavailable(_) => "target_account_id",
            Self::DeclaredBelowResolved { .. } => "safedrops_amount",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_over_allocation_names_both_amounts() {
        let err = SafedropError::OverAllocation {
            requested: dec!(250),
            remaining: dec!(200),
        };
        assert_eq!(
            err.to_string(),
            "The amount 250 exceeds the remaining safedrop amount of 200"
        );
        assert_eq!(err.field(), "amount");
    }
}
