//! Shared fixtures for repository tests against in-memory SQLite.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use forecourt_db::{
    AccountRepository, DailySaleRepository, TransactionRepository,
    entities::{
        accounts, daily_sales,
        sea_orm_active_enums::{AccountKind, TransactionType},
    },
    migration::Migrator,
    repositories::{CreateAccountInput, CreateDailySaleInput, CreateTransactionInput},
};

/// Fresh database with the real migration applied.
pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn staff() -> Uuid {
    Uuid::from_u128(0x5157)
}

pub async fn account(db: &DatabaseConnection, name: &str, kind: AccountKind) -> accounts::Model {
    AccountRepository::new(db.clone())
        .create(CreateAccountInput {
            name: name.to_string(),
            kind,
            description: None,
            is_active: true,
        })
        .await
        .unwrap()
}

/// Credits `amount` to an account through a manual income transaction.
pub async fn fund(db: &DatabaseConnection, account_id: Uuid, amount: Decimal) {
    TransactionRepository::new(db.clone())
        .create(CreateTransactionInput {
            transaction_type: TransactionType::Income,
            amount,
            source_account_id: None,
            target_account_id: Some(account_id),
            description: Some("Till float".to_string()),
            reference_number: None,
            transaction_date: date(2026, 3, 1),
            expense_type_id: None,
            created_by: Some(staff()),
        })
        .await
        .unwrap();
}

pub async fn daily_sale(
    db: &DatabaseConnection,
    sale_date: NaiveDate,
    safedrops_amount: Decimal,
) -> daily_sales::Model {
    DailySaleRepository::new(db.clone())
        .create(CreateDailySaleInput {
            sale_date,
            cash_total: safedrops_amount,
            card_total: Decimal::ZERO,
            fuel_total: Decimal::ZERO,
            safedrops_amount,
            notes: None,
            created_by: Some(staff()),
        })
        .await
        .unwrap()
}

pub async fn balance(db: &DatabaseConnection, id: Uuid) -> Decimal {
    AccountRepository::new(db.clone()).find(id).await.unwrap().balance
}
