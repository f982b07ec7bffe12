//! Loan balance arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forecourt_shared::types::{AmountError, positive_amount};

use super::error::LoanError;
use crate::ledger::TransactionType;

/// Direction of a loan payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanPaymentType {
    /// Pays the loan down.
    Deposit,
    /// Draws more principal.
    Withdrawal,
}

impl LoanPaymentType {
    /// Type of the mirrored ledger transaction.
    #[must_use]
    pub const fn transaction_type(self) -> TransactionType {
        match self {
            Self::Deposit => TransactionType::Expense,
            Self::Withdrawal => TransactionType::Income,
        }
    }
}

/// Result of applying a payment to a loan balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPaymentOutcome {
    /// Balance before the payment.
    pub previous_balance: Decimal,
    /// Balance after the payment; never negative.
    pub new_balance: Decimal,
    /// Type of the mirrored transaction.
    pub transaction_type: TransactionType,
    /// Portion of a deposit beyond the outstanding balance.
    pub overpayment: Decimal,
}

/// Applies a payment of `amount` to a loan with `balance` outstanding.
///
/// Deposits larger than the balance clamp it to zero and report the excess as
/// `overpayment`. The mirrored transaction still records the full amount.
///
/// # Errors
///
/// Returns `NonPositiveAmount` or `TooPrecise` for invalid amounts.
pub fn apply_payment(
    balance: Decimal,
    payment_type: LoanPaymentType,
    amount: Decimal,
) -> Result<LoanPaymentOutcome, LoanError> {
    positive_amount(amount).map_err(|e| match e {
        AmountError::TooPrecise => LoanError::TooPrecise,
        AmountError::NotPositive | AmountError::Negative => LoanError::NonPositiveAmount,
    })?;

    let (new_balance, overpayment) = match payment_type {
        LoanPaymentType::Deposit => {
            let outstanding = balance.max(Decimal::ZERO);
            let overpayment = (amount - outstanding).max(Decimal::ZERO);
            ((balance - amount).max(Decimal::ZERO), overpayment)
        }
        LoanPaymentType::Withdrawal => (balance + amount, Decimal::ZERO),
    };

    Ok(LoanPaymentOutcome {
        previous_balance: balance,
        new_balance,
        transaction_type: payment_type.transaction_type(),
        overpayment,
    })
}
