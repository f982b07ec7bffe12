//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{AmountError, Currency, non_negative_amount, positive_amount};
pub use pagination::{ArchiveScope, PageMeta, PageRequest, PageResponse, SortDirection};
