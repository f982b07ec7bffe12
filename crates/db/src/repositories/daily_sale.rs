//! Daily sale repository.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use forecourt_core::{lifecycle::RecordStatus as CoreStatus, safedrop::SafedropService};
use forecourt_shared::types::{PageRequest, PageResponse, non_negative_amount};

use super::lifecycle::{RecordError, SoftDeletable, find, find_locked};
use super::query::{Sortable, is_unique_violation, paginate, scoped};
use super::safedrop::resolved_total;
use crate::entities::{
    daily_sales, safedrop_resolutions,
    sea_orm_active_enums::{RecordStatus, SaleStatus},
};

const SORTABLE: Sortable<daily_sales::Column> = Sortable {
    columns: &[
        ("sale_date", daily_sales::Column::SaleDate),
        ("cash_total", daily_sales::Column::CashTotal),
        ("fuel_total", daily_sales::Column::FuelTotal),
        ("safedrops_amount", daily_sales::Column::SafedropsAmount),
        ("created_at", daily_sales::Column::CreatedAt),
    ],
    default: "sale_date",
    tie_breaker: daily_sales::Column::Id,
};

#[async_trait]
impl SoftDeletable for daily_sales::Entity {
    const RESOURCE: &'static str = "Daily sale";

    fn id_column() -> daily_sales::Column {
        daily_sales::Column::Id
    }
    fn status_column() -> daily_sales::Column {
        daily_sales::Column::Status
    }
    fn archived_at_column() -> daily_sales::Column {
        daily_sales::Column::ArchivedAt
    }
    fn updated_at_column() -> daily_sales::Column {
        daily_sales::Column::UpdatedAt
    }
    fn status_of(model: &daily_sales::Model) -> CoreStatus {
        model.status.into()
    }

    async fn count_dependents(txn: &DatabaseTransaction, id: Uuid) -> Result<u64, DbErr> {
        safedrop_resolutions::Entity::find()
            .filter(safedrop_resolutions::Column::DailySaleId.eq(id))
            .count(txn)
            .await
    }
}

/// Input for recording a day's sales.
#[derive(Debug, Clone)]
pub struct CreateDailySaleInput {
    /// Business day.
    pub sale_date: NaiveDate,
    /// Cash taken.
    pub cash_total: Decimal,
    /// Card payments.
    pub card_total: Decimal,
    /// Fuel sales.
    pub fuel_total: Decimal,
    /// Cash declared for moving from the till to the bank.
    pub safedrops_amount: Decimal,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Staff member recording the day.
    pub created_by: Option<Uuid>,
}

/// Amendment of a daily sale. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateDailySaleInput {
    /// Cash taken.
    pub cash_total: Option<Decimal>,
    /// Card payments.
    pub card_total: Option<Decimal>,
    /// Fuel sales.
    pub fuel_total: Option<Decimal>,
    /// Declared safedrop amount; never below the resolved total.
    pub safedrops_amount: Option<Decimal>,
    /// Open or closed.
    pub sale_status: Option<SaleStatus>,
    /// Notes; `Some(None)` clears them.
    pub notes: Option<Option<String>>,
}

/// Filter options for listing daily sales.
#[derive(Debug, Clone, Default)]
pub struct DailySaleFilter {
    /// Earliest sale date.
    pub from: Option<NaiveDate>,
    /// Latest sale date.
    pub to: Option<NaiveDate>,
    /// Open or closed.
    pub sale_status: Option<SaleStatus>,
}

/// Daily sale repository.
#[derive(Debug, Clone)]
pub struct DailySaleRepository {
    db: DatabaseConnection,
}

impl DailySaleRepository {
    /// Creates a new daily sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a new business day.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for negative or sub-cent totals and `Duplicate` if
    /// the date already has a record.
    pub async fn create(
        &self,
        input: CreateDailySaleInput,
    ) -> Result<daily_sales::Model, RecordError> {
        for (field, amount) in [
            ("cash_total", input.cash_total),
            ("card_total", input.card_total),
            ("fuel_total", input.fuel_total),
            ("safedrops_amount", input.safedrops_amount),
        ] {
            check_total(field, amount)?;
        }

        let taken = daily_sales::Entity::find()
            .filter(daily_sales::Column::SaleDate.eq(input.sale_date))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(duplicate_date(input.sale_date));
        }

        let now = Utc::now().into();
        let sale = daily_sales::ActiveModel {
            id: Set(Uuid::now_v7()),
            sale_date: Set(input.sale_date),
            cash_total: Set(input.cash_total),
            card_total: Set(input.card_total),
            fuel_total: Set(input.fuel_total),
            safedrops_amount: Set(input.safedrops_amount),
            sale_status: Set(SaleStatus::Open),
            notes: Set(input.notes),
            created_by: Set(input.created_by),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let sale = sale.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_date(input.sale_date)
            } else {
                RecordError::Database(e)
            }
        })?;

        info!(daily_sale_id = %sale.id, sale_date = %sale.sale_date, "Daily sale recorded");
        Ok(sale)
    }

    /// Lists daily sales.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        filter: DailySaleFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<daily_sales::Model>, RecordError> {
        let mut query = scoped(
            daily_sales::Entity::find(),
            daily_sales::Column::Status,
            page.archive_scope(),
        );
        if let Some(from) = filter.from {
            query = query.filter(daily_sales::Column::SaleDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(daily_sales::Column::SaleDate.lte(to));
        }
        if let Some(sale_status) = filter.sale_status {
            query = query.filter(daily_sales::Column::SaleStatus.eq(sale_status));
        }

        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a daily sale by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no sale has the ID.
    pub async fn find(&self, id: Uuid) -> Result<daily_sales::Model, RecordError> {
        find::<daily_sales::Entity, _>(&self.db, id).await
    }

    /// Amends a daily sale.
    ///
    /// The row is locked while the new `safedrops_amount` is checked against
    /// the resolutions already recorded.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `Invalid` for bad totals or a declared amount
    /// below the resolved total.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateDailySaleInput,
    ) -> Result<daily_sales::Model, RecordError> {
        for (field, amount) in [
            ("cash_total", input.cash_total),
            ("card_total", input.card_total),
            ("fuel_total", input.fuel_total),
            ("safedrops_amount", input.safedrops_amount),
        ] {
            if let Some(amount) = amount {
                check_total(field, amount)?;
            }
        }

        let txn = self.db.begin().await?;
        let sale = find_locked::<daily_sales::Entity>(&txn, id).await?;

        if let Some(declared) = input.safedrops_amount {
            let resolved = resolved_total(&txn, id).await?;
            SafedropService::check_declared_amount(declared, resolved)
                .map_err(|e| RecordError::invalid(e.field(), e.to_string()))?;
        }

        let mut active: daily_sales::ActiveModel = sale.into();
        if let Some(v) = input.cash_total {
            active.cash_total = Set(v);
        }
        if let Some(v) = input.card_total {
            active.card_total = Set(v);
        }
        if let Some(v) = input.fuel_total {
            active.fuel_total = Set(v);
        }
        if let Some(v) = input.safedrops_amount {
            active.safedrops_amount = Set(v);
        }
        if let Some(v) = input.sale_status {
            active.sale_status = Set(v);
        }
        if let Some(v) = input.notes {
            active.notes = Set(v);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(daily_sale_id = %id, "Daily sale amended");
        Ok(updated)
    }
}

fn check_total(field: &'static str, amount: Decimal) -> Result<(), RecordError> {
    non_negative_amount(amount)
        .map(|_| ())
        .map_err(|e| RecordError::invalid(field, format!("The {field} {e}")))
}

fn duplicate_date(date: NaiveDate) -> RecordError {
    RecordError::Duplicate(format!("Daily sale for {date} already exists"))
}
