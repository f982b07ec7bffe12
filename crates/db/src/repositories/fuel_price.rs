//! Fuel price repository.
//!
//! Creating a price with any grade set, or changing a grade, queues a
//! spreadsheet push in the same database transaction.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use forecourt_core::{lifecycle::RecordStatus as CoreStatus, pricing::FuelPrices};
use forecourt_shared::types::{PageRequest, PageResponse};

use super::lifecycle::{RecordError, SoftDeletable, find, find_locked};
use super::query::{Sortable, is_unique_violation, paginate, scoped};
use super::sync_job::enqueue_price_push;
use crate::entities::{fuel_prices, sea_orm_active_enums::RecordStatus};

const SORTABLE: Sortable<fuel_prices::Column> = Sortable {
    columns: &[
        ("effective_date", fuel_prices::Column::EffectiveDate),
        ("regular", fuel_prices::Column::Regular),
        ("diesel", fuel_prices::Column::Diesel),
        ("created_at", fuel_prices::Column::CreatedAt),
    ],
    default: "effective_date",
    tie_breaker: fuel_prices::Column::Id,
};

#[async_trait]
impl SoftDeletable for fuel_prices::Entity {
    const RESOURCE: &'static str = "Fuel price";

    fn id_column() -> fuel_prices::Column {
        fuel_prices::Column::Id
    }
    fn status_column() -> fuel_prices::Column {
        fuel_prices::Column::Status
    }
    fn archived_at_column() -> fuel_prices::Column {
        fuel_prices::Column::ArchivedAt
    }
    fn updated_at_column() -> fuel_prices::Column {
        fuel_prices::Column::UpdatedAt
    }
    fn status_of(model: &fuel_prices::Model) -> CoreStatus {
        model.status.into()
    }
}

/// Input for posting a day's fuel prices.
#[derive(Debug, Clone)]
pub struct CreateFuelPriceInput {
    /// Day the prices apply to.
    pub effective_date: NaiveDate,
    /// Prices per grade.
    pub prices: FuelPrices,
}

/// Partial update of a day's prices. `Some(None)` clears a grade.
#[derive(Debug, Clone, Default)]
pub struct UpdateFuelPriceInput {
    /// Regular unleaded.
    pub regular: Option<Option<Decimal>>,
    /// Mid-grade.
    pub midgrade: Option<Option<Decimal>>,
    /// Premium.
    pub premium: Option<Option<Decimal>>,
    /// Diesel.
    pub diesel: Option<Option<Decimal>>,
}

impl UpdateFuelPriceInput {
    fn apply(&self, current: FuelPrices) -> FuelPrices {
        FuelPrices {
            regular: self.regular.unwrap_or(current.regular),
            midgrade: self.midgrade.unwrap_or(current.midgrade),
            premium: self.premium.unwrap_or(current.premium),
            diesel: self.diesel.unwrap_or(current.diesel),
        }
    }
}

/// A stored fuel price and whether a sync job was queued for it.
#[derive(Debug, Clone)]
pub struct SavedFuelPrice {
    /// The stored row.
    pub fuel_price: fuel_prices::Model,
    /// Outbox job queued by this write.
    pub sync_job_id: Option<Uuid>,
}

/// Fuel price repository.
#[derive(Debug, Clone)]
pub struct FuelPriceRepository {
    db: DatabaseConnection,
}

impl FuelPriceRepository {
    /// Creates a new fuel price repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a day's prices and queues the push when any grade is set.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` for a negative or over-precise price and `Duplicate`
    /// when the date already has prices.
    pub async fn create(&self, input: CreateFuelPriceInput) -> Result<SavedFuelPrice, RecordError> {
        check_prices(&input.prices)?;

        let taken = fuel_prices::Entity::find()
            .filter(fuel_prices::Column::EffectiveDate.eq(input.effective_date))
            .count(&self.db)
            .await?;
        if taken > 0 {
            return Err(duplicate_date(input.effective_date));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let fuel_price = fuel_prices::ActiveModel {
            id: Set(Uuid::now_v7()),
            effective_date: Set(input.effective_date),
            regular: Set(input.prices.regular),
            midgrade: Set(input.prices.midgrade),
            premium: Set(input.prices.premium),
            diesel: Set(input.prices.diesel),
            status: Set(RecordStatus::Active),
            archived_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_date(input.effective_date)
            } else {
                RecordError::Database(e)
            }
        })?;

        let sync_job_id = if input.prices.needs_push(None) {
            Some(enqueue_price_push(&txn, fuel_price.id).await?.id)
        } else {
            None
        };
        txn.commit().await?;

        info!(fuel_price_id = %fuel_price.id, effective_date = %fuel_price.effective_date, queued = sync_job_id.is_some(), "Fuel price posted");
        Ok(SavedFuelPrice {
            fuel_price,
            sync_job_id,
        })
    }

    /// Lists fuel prices.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<fuel_prices::Model>, RecordError> {
        let query = scoped(
            fuel_prices::Entity::find(),
            fuel_prices::Column::Status,
            page.archive_scope(),
        );
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a fuel price by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no fuel price has the ID.
    pub async fn find(&self, id: Uuid) -> Result<fuel_prices::Model, RecordError> {
        find::<fuel_prices::Entity, _>(&self.db, id).await
    }

    /// Changes a day's prices and queues the push when a grade changed.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Invalid` for a negative or over-precise price.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateFuelPriceInput,
    ) -> Result<SavedFuelPrice, RecordError> {
        let txn = self.db.begin().await?;

        let current = find_locked::<fuel_prices::Entity>(&txn, id).await?;
        let previous = current.prices();
        let next = input.apply(previous);
        check_prices(&next)?;

        let mut active: fuel_prices::ActiveModel = current.into();
        active.regular = Set(next.regular);
        active.midgrade = Set(next.midgrade);
        active.premium = Set(next.premium);
        active.diesel = Set(next.diesel);
        active.updated_at = Set(Utc::now().into());
        let fuel_price = active.update(&txn).await?;

        let sync_job_id = if next.needs_push(Some(&previous)) {
            Some(enqueue_price_push(&txn, fuel_price.id).await?.id)
        } else {
            debug!(fuel_price_id = %id, "Fuel prices unchanged, no sync queued");
            None
        };
        txn.commit().await?;

        info!(fuel_price_id = %id, queued = sync_job_id.is_some(), "Fuel price updated");
        Ok(SavedFuelPrice {
            fuel_price,
            sync_job_id,
        })
    }
}

fn check_prices(prices: &FuelPrices) -> Result<(), RecordError> {
    match prices.first_invalid() {
        Some(field) => Err(RecordError::invalid(
            field,
            format!("The {field} price must be zero or more with at most 3 decimal places"),
        )),
        None => Ok(()),
    }
}

fn duplicate_date(date: NaiveDate) -> RecordError {
    RecordError::Duplicate(format!("Fuel prices for {date} already exist"))
}
