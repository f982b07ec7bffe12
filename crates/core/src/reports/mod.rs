//! Report generation.
//!
//! Pure aggregation of payroll data into display structures with period and
//! year-to-date totals.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
