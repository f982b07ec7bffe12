//! `SeaORM` Entity for daily_sales table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{RecordStatus, SaleStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sale_date: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub cash_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub card_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub fuel_total: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub safedrops_amount: Decimal,
    pub sale_status: SaleStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub status: RecordStatus,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::safedrop_resolutions::Entity")]
    SafedropResolutions,
}

impl Related<super::safedrop_resolutions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SafedropResolutions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
