//! Property-based tests for safedrop allocation.
//!
//! - Resolved total never exceeds the declared amount
//! - Rejected resolutions leave the position unchanged
//! - Every transfer conserves money between cash and target

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::SafedropError;
use super::service::{SafedropService, SafedropTransfer};
use super::types::{SafedropPosition, SettlementState};

/// Strategy to generate positive amounts (0.01 to 1,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Allocation bound
    // =========================================================================

    /// *For any* declared amount and sequence of requests, the accepted
    /// requests never sum past the declared amount.
    #[test]
    fn prop_resolved_never_exceeds_declared(
        declared in positive_amount(),
        requests in prop::collection::vec(positive_amount(), 1..20),
    ) {
        let mut position = SafedropPosition::new(declared, []);

        for amount in requests {
            match SafedropService::check_allocation(position, amount) {
                Ok(next) => {
                    prop_assert_eq!(next.resolved, position.resolved + amount);
                    position = next;
                }
                Err(SafedropError::OverAllocation { requested, remaining }) => {
                    prop_assert_eq!(requested, amount);
                    prop_assert_eq!(remaining, position.remaining());
                    prop_assert!(amount > remaining);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
            prop_assert!(position.resolved <= position.declared);
        }
    }

    /// *For any* remaining balance, resolving exactly the remainder settles the sale.
    #[test]
    fn prop_resolving_remainder_settles(
        declared in positive_amount(),
        first_cents in 1i64..100_000i64,
    ) {
        let first = Decimal::new(first_cents, 2);
        prop_assume!(first < declared);

        let position = SafedropService::check_allocation(SafedropPosition::new(declared, []), first).unwrap();
        prop_assert_eq!(position.state(), SettlementState::Partial);

        let settled = SafedropService::check_allocation(position, position.remaining()).unwrap();
        prop_assert_eq!(settled.state(), SettlementState::Resolved);
        prop_assert_eq!(settled.resolved, declared);
    }

    // =========================================================================
    // Conservation
    // =========================================================================

    /// *For any* resolution, the cash decrease equals the target increase.
    #[test]
    fn prop_transfer_conserves_money(amount in positive_amount(), a in any::<u128>(), b in any::<u128>()) {
        prop_assume!(a != b);
        let transfer = SafedropTransfer::new(Uuid::from_u128(a), Uuid::from_u128(b), amount).unwrap();
        let effects = transfer.effects();

        prop_assert_eq!(effects.len(), 2);
        prop_assert_eq!(effects.iter().map(|e| e.delta).sum::<Decimal>(), Decimal::ZERO);
        prop_assert_eq!(effects[0].delta, -amount);
        prop_assert_eq!(effects[1].delta, amount);
    }
}
