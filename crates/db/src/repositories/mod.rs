//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod account;
pub mod daily_sale;
pub mod employee;
pub mod expense_type;
pub mod fuel_price;
pub mod lifecycle;
pub mod loan;
pub mod payroll;
pub mod report;
pub mod safedrop;
pub mod sync_job;
pub mod transaction;

mod query;

pub use account::{AccountFilter, AccountRepository, CreateAccountInput, UpdateAccountInput};
pub use daily_sale::{
    CreateDailySaleInput, DailySaleFilter, DailySaleRepository, UpdateDailySaleInput,
};
pub use employee::{CreateEmployeeInput, EmployeeRepository, UpdateEmployeeInput};
pub use expense_type::{CreateExpenseTypeInput, ExpenseTypeRepository, UpdateExpenseTypeInput};
pub use fuel_price::{
    CreateFuelPriceInput, FuelPriceRepository, SavedFuelPrice, UpdateFuelPriceInput,
};
pub use lifecycle::{RecordError, SoftDeletable, archive, purge, restore};
pub use loan::{
    CreateLoanInput, LoanPaymentInput, LoanPaymentResult, LoanRepository, UpdateLoanInput,
};
pub use payroll::{CreatePayrollInput, PayrollFilter, PayrollRepository};
pub use report::ReportRepository;
pub use safedrop::{
    PendingSafedrop, ResolveSafedropInput, ResolvedSafedrop, SafedropRepoError,
    SafedropRepository, SafedropSummary,
};
pub use sync_job::SyncJobRepository;
pub use transaction::{CreateTransactionInput, TransactionFilter, TransactionRepository};
