//! Fuel price routes. Saving prices queues a spreadsheet push.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use forecourt_core::pricing::FuelPrices;
use forecourt_db::{
    FuelPriceRepository,
    entities::fuel_prices,
    repositories::{CreateFuelPriceInput, SavedFuelPrice, UpdateFuelPriceInput},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, double_option},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the fuel price routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fuel-prices", get(list_fuel_prices).post(create_fuel_price))
        .route("/fuel-prices/{id}", get(get_fuel_price).put(update_fuel_price))
        .merge(lifecycle::routes::<fuel_prices::Entity>("/fuel-prices"))
}

/// Request body for a day's prices.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFuelPriceRequest {
    /// Day the prices apply to, one record per date.
    pub effective_date: NaiveDate,
    /// Regular grade.
    pub regular: Option<Decimal>,
    /// Mid grade.
    pub midgrade: Option<Decimal>,
    /// Premium grade.
    pub premium: Option<Decimal>,
    /// Diesel.
    pub diesel: Option<Decimal>,
}

/// Request body for changing prices; `null` clears a grade.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFuelPriceRequest {
    /// Regular grade.
    #[serde(default, deserialize_with = "double_option")]
    pub regular: Option<Option<Decimal>>,
    /// Mid grade.
    #[serde(default, deserialize_with = "double_option")]
    pub midgrade: Option<Option<Decimal>>,
    /// Premium grade.
    #[serde(default, deserialize_with = "double_option")]
    pub premium: Option<Option<Decimal>>,
    /// Diesel.
    #[serde(default, deserialize_with = "double_option")]
    pub diesel: Option<Option<Decimal>>,
}

/// A saved price and the push it queued, if any.
#[derive(Debug, Serialize)]
pub struct FuelPriceResponse {
    /// The stored record.
    #[serde(flatten)]
    pub fuel_price: fuel_prices::Model,
    /// Outbox job written alongside the price.
    pub sync_job_id: Option<Uuid>,
}

impl From<SavedFuelPrice> for FuelPriceResponse {
    fn from(saved: SavedFuelPrice) -> Self {
        Self {
            fuel_price: saved.fuel_price,
            sync_job_id: saved.sync_job_id,
        }
    }
}

async fn list_fuel_prices(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<fuel_prices::Model>>>> {
    let prices = FuelPriceRepository::new((*state.db).clone())
        .list(&page_request)
        .await?;
    Ok(page("Fuel prices retrieved", prices))
}

async fn create_fuel_price(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateFuelPriceRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FuelPriceResponse>>)> {
    let saved = FuelPriceRepository::new((*state.db).clone())
        .create(CreateFuelPriceInput {
            effective_date: payload.effective_date,
            prices: FuelPrices {
                regular: payload.regular,
                midgrade: payload.midgrade,
                premium: payload.premium,
                diesel: payload.diesel,
            },
        })
        .await?;

    info!(
        fuel_price_id = %saved.fuel_price.id,
        effective_date = %saved.fuel_price.effective_date,
        sync_job_id = ?saved.sync_job_id,
        user_id = %auth.user_id(),
        "Fuel prices saved"
    );
    Ok(created("Fuel price created", saved.into()))
}

async fn get_fuel_price(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<fuel_prices::Model>>> {
    let price = FuelPriceRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Fuel price retrieved", price))
}

async fn update_fuel_price(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateFuelPriceRequest>,
) -> ApiResult<Json<ApiResponse<FuelPriceResponse>>> {
    let saved = FuelPriceRepository::new((*state.db).clone())
        .update(
            id,
            UpdateFuelPriceInput {
                regular: payload.regular,
                midgrade: payload.midgrade,
                premium: payload.premium,
                diesel: payload.diesel,
            },
        )
        .await?;

    info!(
        fuel_price_id = %id,
        sync_job_id = ?saved.sync_job_id,
        user_id = %auth.user_id(),
        "Fuel prices updated"
    );
    Ok(ok("Fuel price updated", saved.into()))
}
