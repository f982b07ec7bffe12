//! `SeaORM` Entity for payrolls table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RecordStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payrolls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period_start: Date,
    pub period_end: Date,
    pub pay_date: Date,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))")]
    pub hours_worked: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub gross_pay: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub deductions: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net_pay: Decimal,
    pub status: RecordStatus,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
