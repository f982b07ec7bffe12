//! String-backed enums stored in the database.
//!
//! Each enum mirrors a `forecourt-core` domain type; `From` conversions keep
//! the storage encoding out of the business logic.

use forecourt_core::{
    ledger::{AccountKind as CoreAccountKind, TransactionOrigin as CoreOrigin, TransactionType as CoreType},
    lifecycle::RecordStatus as CoreRecordStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "archived")]
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank")]
    Bank,
    #[sea_orm(string_value = "credit")]
    Credit,
    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ResolutionType {
    #[sea_orm(string_value = "safedrops")]
    Safedrops,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum TransactionOrigin {
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "safedrop")]
    Safedrop,
    #[sea_orm(string_value = "loan_payment")]
    LoanPayment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum SyncJobKind {
    #[sea_orm(string_value = "fuel_price_push")]
    FuelPricePush,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SyncJobStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "succeeded")]
    Succeeded,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<RecordStatus> for CoreRecordStatus {
    fn from(value: RecordStatus) -> Self {
        match value {
            RecordStatus::Active => Self::Active,
            RecordStatus::Archived => Self::Archived,
        }
    }
}

impl From<CoreRecordStatus> for RecordStatus {
    fn from(value: CoreRecordStatus) -> Self {
        match value {
            CoreRecordStatus::Active => Self::Active,
            CoreRecordStatus::Archived => Self::Archived,
        }
    }
}

impl From<AccountKind> for CoreAccountKind {
    fn from(value: AccountKind) -> Self {
        match value {
            AccountKind::Cash => Self::Cash,
            AccountKind::Bank => Self::Bank,
            AccountKind::Credit => Self::Credit,
            AccountKind::Other => Self::Other,
        }
    }
}

impl From<TransactionType> for CoreType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}

impl From<CoreType> for TransactionType {
    fn from(value: CoreType) -> Self {
        match value {
            CoreType::Income => Self::Income,
            CoreType::Expense => Self::Expense,
            CoreType::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionOrigin> for CoreOrigin {
    fn from(value: TransactionOrigin) -> Self {
        match value {
            TransactionOrigin::Manual => Self::Manual,
            TransactionOrigin::Safedrop => Self::Safedrop,
            TransactionOrigin::LoanPayment => Self::LoanPayment,
        }
    }
}
