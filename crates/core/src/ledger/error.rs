//! Ledger error types.

use thiserror::Error;

/// Errors raised while validating a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Amount is zero or negative.
    #[error("Transaction amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has sub-cent precision.
    #[error("Transaction amount must have at most 2 decimal places")]
    TooPrecise,

    /// A source account is required for this transaction type.
    #[error("A source account is required for {0} transactions")]
    MissingSource(&'static str),

    /// A target account is required for this transaction type.
    #[error("A target account is required for {0} transactions")]
    MissingTarget(&'static str),

    /// A source account is not allowed for this transaction type.
    #[error("A source account is not allowed for {0} transactions")]
    UnexpectedSource(&'static str),

    /// A target account is not allowed for this transaction type.
    #[error("A target account is not allowed for {0} transactions")]
    UnexpectedTarget(&'static str),

    /// Transfers need two distinct accounts.
    #[error("Source and target accounts must be different")]
    SameAccount,

    /// Generated transactions follow the record that produced them.
    #[error("Only manual transactions can be archived or restored")]
    NotUserManaged,
}

impl LedgerError {
    /// Returns the request field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount | Self::TooPrecise => "amount",
            Self::MissingSource(_) | Self::UnexpectedSource(_) | Self::SameAccount => {
                "source_account_id"
            }
            Self::MissingTarget(_) | Self::UnexpectedTarget(_) => "target_account_id",
            Self::NotUserManaged => "origin",
        }
    }
}
