//! Single-entry account ledger.
//!
//! This module implements the balance bookkeeping shared by manual
//! transactions, safedrop resolutions and loan payments:
//! - Domain types for accounts and transactions
//! - Balance effects and their reversal
//! - Reference number generation
//! - Error types for ledger validation

pub mod balance;
pub mod error;
pub mod reference;
pub mod types;

pub use balance::{BalanceEffect, TransactionAccounts, reversed};
pub use error::LedgerError;
pub use reference::{LOAN_PAYMENT_PREFIX, SAFEDROP_PREFIX, generate_reference, reference_number};
pub use types::{AccountKind, TransactionOrigin, TransactionType};
