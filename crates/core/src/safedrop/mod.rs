//! Safedrop reconciliation.
//!
//! Cash dropped into the safe during a day is declared on the daily sale and
//! later resolved, in one or more parts, into bank accounts. Each resolution
//! is a transfer out of the cash account.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::SafedropError;
pub use service::{SafedropService, SafedropTransfer};
pub use types::{SafedropPosition, SettlementState};
