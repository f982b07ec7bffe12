//! Ledger domain types.

use serde::{Deserialize, Serialize};

/// Kind of a money account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// The notional till/safe cash account. At most one is active.
    Cash,
    /// Bank account.
    Bank,
    /// Credit card or line of credit.
    Credit,
    /// Anything else.
    Other,
}

/// Transaction type, which decides the balance effect.
///
/// - Income credits the target account
/// - Expense debits the source account
/// - Transfer debits the source and credits the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
    /// Money moving between two accounts.
    Transfer,
}

/// What created a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionOrigin {
    /// Entered by staff.
    Manual,
    /// Created by a safedrop resolution.
    Safedrop,
    /// Mirror of a loan payment.
    LoanPayment,
}

impl TransactionOrigin {
    /// Only manual transactions may be archived or restored by staff.
    /// Generated ones belong to the record that produced them.
    #[must_use]
    pub const fn is_user_managed(self) -> bool {
        matches!(self, Self::Manual)
    }
}
