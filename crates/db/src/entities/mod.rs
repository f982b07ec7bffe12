//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod daily_sales;
pub mod employees;
pub mod expense_types;
pub mod fuel_prices;
pub mod loans;
pub mod payrolls;
pub mod safedrop_resolutions;
pub mod sea_orm_active_enums;
pub mod sync_jobs;
pub mod transactions;
