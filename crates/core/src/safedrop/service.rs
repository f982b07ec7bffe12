//! Safedrop allocation checks and transfer planning.
//!
//! The database layer locks the daily sale and both accounts, loads the
//! current position, and then asks this service whether the resolution may
//! proceed and which balances to touch.

use rust_decimal::Decimal;
use uuid::Uuid;

use forecourt_shared::types::{AmountError, positive_amount};

use super::error::SafedropError;
use super::types::SafedropPosition;
use crate::ledger::{BalanceEffect, TransactionAccounts, TransactionType};

/// Stateless safedrop rules.
pub struct SafedropService;

impl SafedropService {
    /// Checks a resolution of `amount` against the current position.
    ///
    /// Returns the position after the resolution is recorded.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveAmount`, `TooPrecise` or `OverAllocation`.
    pub fn check_allocation(
        position: SafedropPosition,
        amount: Decimal,
    ) -> Result<SafedropPosition, SafedropError> {
        positive_amount(amount).map_err(|e| match e {
            AmountError::TooPrecise => SafedropError::TooPrecise,
            AmountError::NotPositive | AmountError::Negative => SafedropError::NonPositiveAmount,
        })?;

        let remaining = position.remaining();
        if amount > remaining {
            return Err(SafedropError::OverAllocation {
                requested: amount,
                remaining,
            });
        }

        Ok(SafedropPosition {
            declared: position.declared,
            resolved: position.resolved + amount,
        })
    }

    /// Checks an amended `safedrops_amount` against what is already resolved.
    ///
    /// # Errors
    ///
    /// Returns `DeclaredBelowResolved` if the amendment would strand resolutions.
    pub fn check_declared_amount(
        declared: Decimal,
        resolved: Decimal,
    ) -> Result<(), SafedropError> {
        if declared < resolved {
            return Err(SafedropError::DeclaredBelowResolved { resolved });
        }
        Ok(())
    }
}

/// Cash-to-bank transfer produced by a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafedropTransfer {
    /// The active cash account.
    pub cash_account_id: Uuid,
    /// The account receiving the cash.
    pub target_account_id: Uuid,
    /// Resolved amount.
    pub amount: Decimal,
}

impl SafedropTransfer {
    /// Plans a transfer from the cash account to `target_account_id`.
    ///
    /// # Errors
    ///
    /// Returns `TargetIsCash` when both accounts are the same.
    pub fn new(
        cash_account_id: Uuid,
        target_account_id: Uuid,
        amount: Decimal,
    ) -> Result<Self, SafedropError> {
        if cash_account_id == target_account_id {
            return Err(SafedropError::TargetIsCash);
        }
        Ok(Self {
            cash_account_id,
            target_account_id,
            amount,
        })
    }

    /// Account ids in the order their rows must be locked.
    #[must_use]
    pub fn lock_order(&self) -> [Uuid; 2] {
        let mut ids = [self.cash_account_id, self.target_account_id];
        ids.sort();
        ids
    }

    /// Account references of the mirrored transfer transaction.
    #[must_use]
    pub const fn accounts(&self) -> TransactionAccounts {
        TransactionAccounts {
            source: Some(self.cash_account_id),
            target: Some(self.target_account_id),
        }
    }

    /// Balance deltas: cash is debited, the target credited.
    #[must_use]
    pub fn effects(&self) -> Vec<BalanceEffect> {
        TransactionType::Transfer.balance_effects(self.amount, self.accounts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_documented_example() {
        let position = SafedropPosition::new(dec!(500), []);

        let position = SafedropService::check_allocation(position, dec!(300)).unwrap();
        assert_eq!(position.remaining(), dec!(200));

        let err = SafedropService::check_allocation(position, dec!(250)).unwrap_err();
        assert_eq!(
            err,
            SafedropError::OverAllocation {
                requested: dec!(250),
                remaining: dec!(200),
            }
        );

        let position = SafedropService::check_allocation(position, dec!(200)).unwrap();
        assert_eq!(position.remaining(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_invalid_amounts() {
        let position = SafedropPosition::new(dec!(100), []);
        assert_eq!(
            SafedropService::check_allocation(position, dec!(0)),
            Err(SafedropError::NonPositiveAmount)
        );
        assert_eq!(
            SafedropService::check_allocation(position, dec!(-1)),
            Err(SafedropError::NonPositiveAmount)
        );
        assert_eq!(
            SafedropService::check_allocation(position, dec!(1.005)),
            Err(SafedropError::TooPrecise)
        );
    }

    #[test]
    fn test_declared_amount_amendment() {
        assert!(SafedropService::check_declared_amount(dec!(300), dec!(300)).is_ok());
        assert_eq!(
            SafedropService::check_declared_amount(dec!(299.99), dec!(300)),
            Err(SafedropError::DeclaredBelowResolved { resolved: dec!(300) })
        );
    }

    #[test]
    fn test_transfer_rejects_cash_target() {
        let cash = Uuid::from_u128(7);
        assert_eq!(
            SafedropTransfer::new(cash, cash, dec!(10)),
            Err(SafedropError::TargetIsCash)
        );
    }

    #[test]
    fn test_lock_order_is_ascending() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let a = SafedropTransfer::new(high, low, dec!(10)).unwrap();
        let b = SafedropTransfer::new(low, high, dec!(10)).unwrap();
        assert_eq!(a.lock_order(), [low, high]);
        assert_eq!(b.lock_order(), [low, high]);
    }

    #[test]
    fn test_effects_move_cash_to_target() {
        let transfer =
            SafedropTransfer::new(Uuid::from_u128(1), Uuid::from_u128(2), dec!(300)).unwrap();
        let effects = transfer.effects();
        assert_eq!(effects[0].account_id, Uuid::from_u128(1));
        assert_eq!(effects[0].delta, dec!(-300));
        assert_eq!(effects[1].account_id, Uuid::from_u128(2));
        assert_eq!(effects[1].delta, dec!(300));
    }
}
