//! Core business logic for Forecourt.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `lifecycle` - Archive/restore/purge transitions
//! - `ledger` - Account balance effects and reference numbers
//! - `safedrop` - Safedrop allocation and cash-to-bank transfers
//! - `loan` - Loan payment arithmetic
//! - `pricing` - Fuel price change detection and sheet placement
//! - `retry` - Background job retry policy
//! - `reports` - Payroll report aggregation

pub mod ledger;
pub mod lifecycle;
pub mod loan;
pub mod pricing;
pub mod reports;
pub mod retry;
pub mod safedrop;
