//! Safedrop domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much of a day's safedrop has been moved into bank accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    /// Nothing resolved yet.
    Pending,
    /// Some, but not all, resolved.
    Partial,
    /// Fully resolved (or nothing was declared).
    Resolved,
}

/// Declared and resolved safedrop totals of one daily sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafedropPosition {
    /// `safedrops_amount` of the daily sale.
    pub declared: Decimal,
    /// Sum of resolutions recorded so far.
    pub resolved: Decimal,
}

impl SafedropPosition {
    /// Creates a position from the declared amount and the resolutions so far.
    #[must_use]
    pub fn new(declared: Decimal, resolutions: impl IntoIterator<Item = Decimal>) -> Self {
        Self {
            declared,
            resolved: resolutions.into_iter().sum(),
        }
    }

    /// Amount still available for resolution.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        (self.declared - self.resolved).max(Decimal::ZERO)
    }

    /// Settlement state derived from the totals.
    #[must_use]
    pub fn state(&self) -> SettlementState {
        if self.remaining().is_zero() {
            SettlementState::Resolved
        } else if self.resolved.is_zero() {
            SettlementState::Pending
        } else {
            SettlementState::Partial
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(500), vec![], dec!(500), SettlementState::Pending)]
    #[case(dec!(500), vec![dec!(300)], dec!(200), SettlementState::Partial)]
    #[case(dec!(500), vec![dec!(300), dec!(200)], dec!(0), SettlementState::Resolved)]
    #[case(dec!(0), vec![], dec!(0), SettlementState::Resolved)]
    fn test_position(
        #[case] declared: Decimal,
        #[case] resolutions: Vec<Decimal>,
        #[case] remaining: Decimal,
        #[case] state: SettlementState,
    ) {
        let position = SafedropPosition::new(declared, resolutions);
        assert_eq!(position.remaining(), remaining);
        assert_eq!(position.state(), state);
    }
}
