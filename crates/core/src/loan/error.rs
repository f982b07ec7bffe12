//! Loan payment errors.

use thiserror::Error;

/// Errors that reject a loan payment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    /// Amount is zero or negative.
    #[error("The amount must be greater than zero")]
    NonPositiveAmount,

    /// Amount has sub-cent precision.
    #[error("The amount must have at most 2 decimal places")]
    TooPrecise,
}
