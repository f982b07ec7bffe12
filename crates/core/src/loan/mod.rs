//! Loan payment processing.
//!
//! A deposit pays a loan down, a withdrawal draws more from it. Each payment
//! is mirrored into a ledger transaction that carries no account references.

pub mod error;
pub mod service;

#[cfg(test)]
mod service_props;

pub use error::LoanError;
pub use service::{LoanPaymentOutcome, LoanPaymentType, apply_payment};
