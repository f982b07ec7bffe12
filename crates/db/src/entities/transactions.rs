//! `SeaORM` Entity for transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RecordStatus, TransactionOrigin, TransactionType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_type: TransactionType,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    pub source_account_id: Option<Uuid>,
    pub target_account_id: Option<Uuid>,
    pub description: Option<String>,
    pub reference_number: Option<String>,
    pub transaction_date: Date,
    pub origin: TransactionOrigin,
    pub loan_id: Option<Uuid>,
    pub expense_type_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub status: RecordStatus,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id"
    )]
    Loans,
    #[sea_orm(
        belongs_to = "super::expense_types::Entity",
        from = "Column::ExpenseTypeId",
        to = "super::expense_types::Column::Id"
    )]
    ExpenseTypes,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl Related<super::expense_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseTypes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
