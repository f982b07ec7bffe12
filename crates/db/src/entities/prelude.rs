//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::daily_sales::Entity as DailySales;
pub use super::employees::Entity as Employees;
pub use super::expense_types::Entity as ExpenseTypes;
pub use super::fuel_prices::Entity as FuelPrices;
pub use super::loans::Entity as Loans;
pub use super::payrolls::Entity as Payrolls;
pub use super::safedrop_resolutions::Entity as SafedropResolutions;
pub use super::sync_jobs::Entity as SyncJobs;
pub use super::transactions::Entity as Transactions;
