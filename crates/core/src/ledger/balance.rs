//! Balance effects of ledger transactions.
//!
//! An account balance is the signed sum of every settled transaction that
//! references it. These helpers turn a transaction into the per-account
//! deltas that keep that invariant when applied, or undo them on archive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use forecourt_shared::types::{AmountError, positive_amount};

use super::error::LedgerError;
use super::types::TransactionType;

/// Change to a single account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEffect {
    /// The account being changed.
    pub account_id: Uuid,
    /// Signed amount added to the balance.
    pub delta: Decimal,
}

/// Account references of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionAccounts {
    /// Account money leaves.
    pub source: Option<Uuid>,
    /// Account money enters.
    pub target: Option<Uuid>,
}

impl TransactionType {
    /// Returns the lowercase name used in messages and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    /// Validates a manually entered transaction.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` naming the first offending field.
    pub fn validate_manual(
        self,
        amount: Decimal,
        accounts: TransactionAccounts,
    ) -> Result<(), LedgerError> {
        positive_amount(amount).map_err(|e| match e {
            AmountError::TooPrecise => LedgerError::TooPrecise,
            AmountError::NotPositive | AmountError::Negative => LedgerError::NonPositiveAmount,
        })?;

        let name = self.as_str();
        match (self, accounts.source, accounts.target) {
            (Self::Income, Some(_), _) => Err(LedgerError::UnexpectedSource(name)),
            (Self::Income | Self::Transfer, _, None) => Err(LedgerError::MissingTarget(name)),
            (Self::Expense | Self::Transfer, None, _) => Err(LedgerError::MissingSource(name)),
            (Self::Expense, _, Some(_)) => Err(LedgerError::UnexpectedTarget(name)),
            (Self::Transfer, Some(source), Some(target)) if source == target => {
                Err(LedgerError::SameAccount)
            }
            _ => Ok(()),
        }
    }

    /// Computes the balance deltas of a settled transaction.
    ///
    /// Missing account references produce no effect, so loan-payment
    /// mirrors (which carry no accounts) leave every balance alone.
    #[must_use]
    pub fn balance_effects(self, amount: Decimal, accounts: TransactionAccounts) -> Vec<BalanceEffect> {
        let debit = accounts.source.map(|account_id| BalanceEffect {
            account_id,
            delta: -amount,
        });
        let credit = accounts.target.map(|account_id| BalanceEffect {
            account_id,
            delta: amount,
        });

        match self {
            Self::Income => credit.into_iter().collect(),
            Self::Expense => debit.into_iter().collect(),
            Self::Transfer => debit.into_iter().chain(credit).collect(),
        }
    }
}

/// Negates a set of balance effects.
#[must_use]
pub fn reversed(effects: &[BalanceEffect]) -> Vec<BalanceEffect> {
    effects
        .iter()
        .map(|e| BalanceEffect {
            account_id: e.account_id,
            delta: -e.delta,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn accounts(source: Option<u128>, target: Option<u128>) -> TransactionAccounts {
        TransactionAccounts {
            source: source.map(Uuid::from_u128),
            target: target.map(Uuid::from_u128),
        }
    }

    #[rstest]
    #[case(TransactionType::Income, accounts(None, Some(2)), Ok(()))]
    #[case(TransactionType::Income, accounts(Some(1), Some(2)), Err(LedgerError::UnexpectedSource("income")))]
    #[case(TransactionType::Income, accounts(None, None), Err(LedgerError::MissingTarget("income")))]
    #[case(TransactionType::Expense, accounts(Some(1), None), Ok(()))]
    #[case(TransactionType::Expense, accounts(None, None), Err(LedgerError::MissingSource("expense")))]
    #[case(TransactionType::Expense, accounts(Some(1), Some(2)), Err(LedgerError::UnexpectedTarget("expense")))]
    #[case(TransactionType::Transfer, accounts(Some(1), Some(2)), Ok(()))]
    #[case(TransactionType::Transfer, accounts(Some(1), None), Err(LedgerError::MissingTarget("transfer")))]
    #[case(TransactionType::Transfer, accounts(None, Some(2)), Err(LedgerError::MissingSource("transfer")))]
    #[case(TransactionType::Transfer, accounts(Some(1), Some(1)), Err(LedgerError::SameAccount))]
    fn test_validate_manual_accounts(
        #[case] tx_type: TransactionType,
        #[case] accounts: TransactionAccounts,
        #[case] expected: Result<(), LedgerError>,
    ) {
        assert_eq!(tx_type.validate_manual(dec!(10), accounts), expected);
    }

    #[rstest]
    #[case(dec!(0), LedgerError::NonPositiveAmount)]
    #[case(dec!(-5), LedgerError::NonPositiveAmount)]
    #[case(dec!(1.001), LedgerError::TooPrecise)]
    fn test_validate_manual_amount(#[case] amount: Decimal, #[case] expected: LedgerError) {
        let result = TransactionType::Income.validate_manual(amount, accounts(None, Some(2)));
        assert_eq!(result, Err(expected));
    }

    #[test]
    fn test_transfer_effects_conserve_money() {
        let effects = TransactionType::Transfer.balance_effects(dec!(300), accounts(Some(1), Some(2)));
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].account_id, Uuid::from_u128(1));
        assert_eq!(effects[0].delta, dec!(-300));
        assert_eq!(effects[1].delta, dec!(300));
        assert_eq!(effects.iter().map(|e| e.delta).sum::<Decimal>(), Decimal::ZERO);
    }

    #[test]
    fn test_income_and_expense_effects() {
        let income = TransactionType::Income.balance_effects(dec!(50), accounts(None, Some(2)));
        assert_eq!(income, vec![BalanceEffect { account_id: Uuid::from_u128(2), delta: dec!(50) }]);

        let expense = TransactionType::Expense.balance_effects(dec!(50), accounts(Some(1), None));
        assert_eq!(expense, vec![BalanceEffect { account_id: Uuid::from_u128(1), delta: dec!(-50) }]);
    }

    #[test]
    fn test_loan_mirror_has_no_effect() {
        let effects = TransactionType::Expense.balance_effects(dec!(50), TransactionAccounts::default());
        assert!(effects.is_empty());
    }

    #[test]
    fn test_reversed_cancels_out() {
        let effects = TransactionType::Transfer.balance_effects(dec!(12.5), accounts(Some(1), Some(2)));
        let undo = reversed(&effects);
        for (apply, revert) in effects.iter().zip(&undo) {
            assert_eq!(apply.account_id, revert.account_id);
            assert_eq!(apply.delta + revert.delta, Decimal::ZERO);
        }
    }
}
