//! `SeaORM` Entity for fuel_prices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RecordStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "fuel_prices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub effective_date: Date,
    #[sea_orm(column_type = "Decimal(Some((8, 3)))", nullable)]
    pub regular: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((8, 3)))", nullable)]
    pub midgrade: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((8, 3)))", nullable)]
    pub premium: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((8, 3)))", nullable)]
    pub diesel: Option<Decimal>,
    pub status: RecordStatus,
    pub archived_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Prices in domain form.
    #[must_use]
    pub const fn prices(&self) -> forecourt_core::pricing::FuelPrices {
        forecourt_core::pricing::FuelPrices {
            regular: self.regular,
            midgrade: self.midgrade,
            premium: self.premium,
            diesel: self.diesel,
        }
    }
}
