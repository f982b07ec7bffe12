//! Initial schema.
//!
//! Written with the schema builder so the same migration runs on PostgreSQL
//! in production and SQLite in tests. Enum columns are stored as strings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Columns shared by every lifecycle-managed table.
#[derive(Iden)]
enum Record {
    Status,
    ArchivedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    Kind,
    Description,
    Balance,
    IsActive,
}

#[derive(Iden)]
enum Loans {
    Table,
    Id,
    Name,
    Currency,
    Amount,
    Lender,
    Notes,
}

#[derive(Iden)]
enum ExpenseTypes {
    Table,
    Id,
    Name,
    ParentId,
}

#[derive(Iden)]
enum DailySales {
    Table,
    Id,
    SaleDate,
    CashTotal,
    CardTotal,
    FuelTotal,
    SafedropsAmount,
    SaleStatus,
    Notes,
    CreatedBy,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    TransactionType,
    Amount,
    SourceAccountId,
    TargetAccountId,
    Description,
    ReferenceNumber,
    TransactionDate,
    Origin,
    LoanId,
    ExpenseTypeId,
    CreatedBy,
}

#[derive(Iden)]
enum SafedropResolutions {
    Table,
    Id,
    DailySaleId,
    AccountId,
    Amount,
    ResolutionType,
    TransactionId,
    ReferenceNumber,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Employees {
    Table,
    Id,
    Name,
    Position,
    HourlyRate,
}

#[derive(Iden)]
enum Payrolls {
    Table,
    Id,
    EmployeeId,
    PeriodStart,
    PeriodEnd,
    PayDate,
    HoursWorked,
    GrossPay,
    Deductions,
    NetPay,
}

#[derive(Iden)]
enum FuelPrices {
    Table,
    Id,
    EffectiveDate,
    Regular,
    Midgrade,
    Premium,
    Diesel,
}

#[derive(Iden)]
enum SyncJobs {
    Table,
    Id,
    Kind,
    FuelPriceId,
    Status,
    Attempts,
    NextAttemptAt,
    LastError,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Column helpers
// ─────────────────────────────────────────────────────────────────────────────

fn money<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).decimal_len(14, 2).not_null().to_owned()
}

fn with_record_columns(table: &mut TableCreateStatement) -> TableCreateStatement {
    table
        .col(ColumnDef::new(Record::Status).string_len(16).not_null())
        .col(ColumnDef::new(Record::ArchivedAt).timestamp_with_time_zone().null())
        .col(ColumnDef::new(Record::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Record::UpdatedAt).timestamp_with_time_zone().not_null())
        .to_owned()
}

fn restrict<T: IntoTableRef, C: IntoIden, R: IntoTableRef, D: IntoIden>(
    name: &str,
    from: (T, C),
    to: (R, D),
) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(from.0, from.1)
        .to(to.0, to.1)
        .on_delete(ForeignKeyAction::Restrict)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    #[allow(clippy::too_many_lines)]
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // Accounts, loans, expense types
        // ============================================================
        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Name).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Accounts::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::Description).text().null())
                    .col(money(Accounts::Balance))
                    .col(ColumnDef::new(Accounts::IsActive).boolean().not_null()),
            ))
            .await?;

        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(Loans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Loans::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Loans::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Loans::Currency).string_len(3).not_null())
                    .col(money(Loans::Amount))
                    .col(ColumnDef::new(Loans::Lender).string_len(120).null())
                    .col(ColumnDef::new(Loans::Notes).text().null()),
            ))
            .await?;

        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(ExpenseTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ExpenseTypes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ExpenseTypes::Name).string_len(120).not_null())
                    .col(ColumnDef::new(ExpenseTypes::ParentId).uuid().null())
                    .foreign_key(&mut restrict(
                        "fk-expense_types-parent_id",
                        (ExpenseTypes::Table, ExpenseTypes::ParentId),
                        (ExpenseTypes::Table, ExpenseTypes::Id),
                    )),
            ))
            .await?;

        // ============================================================
        // Daily sales, transactions, safedrop resolutions
        // ============================================================
        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(DailySales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailySales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DailySales::SaleDate).date().not_null().unique_key())
                    .col(money(DailySales::CashTotal))
                    .col(money(DailySales::CardTotal))
                    .col(money(DailySales::FuelTotal))
                    .col(money(DailySales::SafedropsAmount))
                    .col(ColumnDef::new(DailySales::SaleStatus).string_len(16).not_null())
                    .col(ColumnDef::new(DailySales::Notes).text().null())
                    .col(ColumnDef::new(DailySales::CreatedBy).uuid().null()),
            ))
            .await?;

        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transactions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Transactions::TransactionType).string_len(16).not_null())
                    .col(money(Transactions::Amount))
                    .col(ColumnDef::new(Transactions::SourceAccountId).uuid().null())
                    .col(ColumnDef::new(Transactions::TargetAccountId).uuid().null())
                    .col(ColumnDef::new(Transactions::Description).text().null())
                    .col(ColumnDef::new(Transactions::ReferenceNumber).string_len(32).null())
                    .col(ColumnDef::new(Transactions::TransactionDate).date().not_null())
                    .col(ColumnDef::new(Transactions::Origin).string_len(16).not_null())
                    .col(ColumnDef::new(Transactions::LoanId).uuid().null())
                    .col(ColumnDef::new(Transactions::ExpenseTypeId).uuid().null())
                    .col(ColumnDef::new(Transactions::CreatedBy).uuid().null())
                    .foreign_key(&mut restrict(
                        "fk-transactions-source_account_id",
                        (Transactions::Table, Transactions::SourceAccountId),
                        (Accounts::Table, Accounts::Id),
                    ))
                    .foreign_key(&mut restrict(
                        "fk-transactions-target_account_id",
                        (Transactions::Table, Transactions::TargetAccountId),
                        (Accounts::Table, Accounts::Id),
                    ))
                    .foreign_key(&mut restrict(
                        "fk-transactions-loan_id",
                        (Transactions::Table, Transactions::LoanId),
                        (Loans::Table, Loans::Id),
                    ))
                    .foreign_key(&mut restrict(
                        "fk-transactions-expense_type_id",
                        (Transactions::Table, Transactions::ExpenseTypeId),
                        (ExpenseTypes::Table, ExpenseTypes::Id),
                    )),
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SafedropResolutions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SafedropResolutions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SafedropResolutions::DailySaleId).uuid().not_null())
                    .col(ColumnDef::new(SafedropResolutions::AccountId).uuid().not_null())
                    .col(money(SafedropResolutions::Amount))
                    .col(ColumnDef::new(SafedropResolutions::ResolutionType).string_len(16).not_null())
                    .col(ColumnDef::new(SafedropResolutions::TransactionId).uuid().not_null())
                    .col(ColumnDef::new(SafedropResolutions::ReferenceNumber).string_len(32).not_null())
                    .col(ColumnDef::new(SafedropResolutions::Note).text().null())
                    .col(ColumnDef::new(SafedropResolutions::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(SafedropResolutions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(&mut restrict(
                        "fk-safedrop_resolutions-daily_sale_id",
                        (SafedropResolutions::Table, SafedropResolutions::DailySaleId),
                        (DailySales::Table, DailySales::Id),
                    ))
                    .foreign_key(&mut restrict(
                        "fk-safedrop_resolutions-account_id",
                        (SafedropResolutions::Table, SafedropResolutions::AccountId),
                        (Accounts::Table, Accounts::Id),
                    ))
                    .foreign_key(&mut restrict(
                        "fk-safedrop_resolutions-transaction_id",
                        (SafedropResolutions::Table, SafedropResolutions::TransactionId),
                        (Transactions::Table, Transactions::Id),
                    ))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // Employees and payrolls
        // ============================================================
        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(Employees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Employees::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Employees::Name).string_len(120).not_null())
                    .col(ColumnDef::new(Employees::Position).string_len(120).null())
                    .col(ColumnDef::new(Employees::HourlyRate).decimal_len(10, 2).not_null()),
            ))
            .await?;

        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(Payrolls::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payrolls::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Payrolls::EmployeeId).uuid().not_null())
                    .col(ColumnDef::new(Payrolls::PeriodStart).date().not_null())
                    .col(ColumnDef::new(Payrolls::PeriodEnd).date().not_null())
                    .col(ColumnDef::new(Payrolls::PayDate).date().not_null())
                    .col(ColumnDef::new(Payrolls::HoursWorked).decimal_len(8, 2).not_null())
                    .col(money(Payrolls::GrossPay))
                    .col(money(Payrolls::Deductions))
                    .col(money(Payrolls::NetPay))
                    .foreign_key(&mut restrict(
                        "fk-payrolls-employee_id",
                        (Payrolls::Table, Payrolls::EmployeeId),
                        (Employees::Table, Employees::Id),
                    )),
            ))
            .await?;

        // ============================================================
        // Fuel prices and the sync outbox
        // ============================================================
        manager
            .create_table(with_record_columns(
                Table::create()
                    .table(FuelPrices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FuelPrices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FuelPrices::EffectiveDate).date().not_null().unique_key())
                    .col(ColumnDef::new(FuelPrices::Regular).decimal_len(8, 3).null())
                    .col(ColumnDef::new(FuelPrices::Midgrade).decimal_len(8, 3).null())
                    .col(ColumnDef::new(FuelPrices::Premium).decimal_len(8, 3).null())
                    .col(ColumnDef::new(FuelPrices::Diesel).decimal_len(8, 3).null()),
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SyncJobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SyncJobs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(SyncJobs::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(SyncJobs::FuelPriceId).uuid().not_null())
                    .col(ColumnDef::new(SyncJobs::Status).string_len(16).not_null())
                    .col(ColumnDef::new(SyncJobs::Attempts).integer().not_null())
                    .col(ColumnDef::new(SyncJobs::NextAttemptAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(SyncJobs::LastError).text().null())
                    .col(ColumnDef::new(SyncJobs::CompletedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(SyncJobs::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(SyncJobs::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // Indexes
        // ============================================================
        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-transaction_date")
                    .table(Transactions::Table)
                    .col(Transactions::TransactionDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-safedrop_resolutions-daily_sale_id")
                    .table(SafedropResolutions::Table)
                    .col(SafedropResolutions::DailySaleId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payrolls-employee_id-pay_date")
                    .table(Payrolls::Table)
                    .col(Payrolls::EmployeeId)
                    .col(Payrolls::PayDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sync_jobs-status-next_attempt_at")
                    .table(SyncJobs::Table)
                    .col(SyncJobs::Status)
                    .col(SyncJobs::NextAttemptAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            SyncJobs::Table.into_iden(),
            FuelPrices::Table.into_iden(),
            Payrolls::Table.into_iden(),
            Employees::Table.into_iden(),
            SafedropResolutions::Table.into_iden(),
            Transactions::Table.into_iden(),
            DailySales::Table.into_iden(),
            ExpenseTypes::Table.into_iden(),
            Loans::Table.into_iden(),
            Accounts::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
