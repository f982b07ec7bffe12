//! Daily sale routes and the safedrop resolutions recorded against a sale.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use forecourt_db::{
    DailySaleRepository, SafedropRepository,
    entities::{daily_sales, sea_orm_active_enums::SaleStatus},
    repositories::{
        CreateDailySaleInput, DailySaleFilter, ResolveSafedropInput, ResolvedSafedrop,
        SafedropSummary, UpdateDailySaleInput,
    },
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, double_option, non_negative_money, positive_money},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the daily sale routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/daily-sales", get(list_daily_sales).post(create_daily_sale))
        .route("/daily-sales/{id}", get(get_daily_sale).put(update_daily_sale))
        .route(
            "/daily-sales/{id}/safedrops",
            get(list_safedrops).post(resolve_safedrop),
        )
        .merge(lifecycle::routes::<daily_sales::Entity>("/daily-sales"))
}

/// Query filters for listing daily sales.
#[derive(Debug, Default, Deserialize)]
pub struct ListDailySalesQuery {
    /// First sale date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last sale date (inclusive).
    pub to: Option<NaiveDate>,
    /// Filter by `open`/`closed`.
    pub sale_status: Option<SaleStatus>,
}

/// Request body for recording a day's sales.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDailySaleRequest {
    /// Business day, one record per date.
    pub sale_date: NaiveDate,
    /// Cash taken.
    #[validate(custom(function = "non_negative_money"))]
    pub cash_total: Decimal,
    /// Card payments.
    #[validate(custom(function = "non_negative_money"))]
    pub card_total: Decimal,
    /// Fuel sales.
    #[validate(custom(function = "non_negative_money"))]
    pub fuel_total: Decimal,
    /// Cash dropped into the safe.
    #[validate(custom(function = "non_negative_money"))]
    pub safedrops_amount: Decimal,
    /// Notes.
    pub notes: Option<String>,
}

/// Request body for amending a day's sales.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDailySaleRequest {
    /// Cash taken.
    #[validate(custom(function = "non_negative_money"))]
    pub cash_total: Option<Decimal>,
    /// Card payments.
    #[validate(custom(function = "non_negative_money"))]
    pub card_total: Option<Decimal>,
    /// Fuel sales.
    #[validate(custom(function = "non_negative_money"))]
    pub fuel_total: Option<Decimal>,
    /// Cannot go below what is already resolved.
    #[validate(custom(function = "non_negative_money"))]
    pub safedrops_amount: Option<Decimal>,
    /// Open or close the day.
    pub sale_status: Option<SaleStatus>,
    /// `null` clears the notes.
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

/// Request body for resolving safedrop cash into an account.
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveSafedropRequest {
    /// Receiving account; must not be the cash account.
    pub target_account_id: Uuid,
    /// Amount moved out of cash.
    #[validate(custom(function = "positive_money"))]
    pub amount: Decimal,
    /// Note stored on the resolution.
    #[validate(length(max = 1000, message = "The note may not exceed 1000 characters"))]
    pub note: Option<String>,
}

/// GET `/daily-sales` - List daily sales.
async fn list_daily_sales(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListDailySalesQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<daily_sales::Model>>>> {
    let filter = DailySaleFilter {
        from: query.from,
        to: query.to,
        sale_status: query.sale_status,
    };
    let sales = DailySaleRepository::new((*state.db).clone())
        .list(filter, &page_request)
        .await?;
    Ok(page("Daily sales retrieved", sales))
}

/// POST `/daily-sales` - Record a day's sales.
async fn create_daily_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateDailySaleRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<daily_sales::Model>>)> {
    let sale = DailySaleRepository::new((*state.db).clone())
        .create(CreateDailySaleInput {
            sale_date: payload.sale_date,
            cash_total: payload.cash_total,
            card_total: payload.card_total,
            fuel_total: payload.fuel_total,
            safedrops_amount: payload.safedrops_amount,
            notes: payload.notes,
            created_by: Some(auth.user_id()),
        })
        .await?;

    info!(
        daily_sale_id = %sale.id,
        sale_date = %sale.sale_date,
        user_id = %auth.user_id(),
        "Daily sale created"
    );
    Ok(created("Daily sale created", sale))
}

/// GET `/daily-sales/{id}` - Get a daily sale.
async fn get_daily_sale(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<daily_sales::Model>>> {
    let sale = DailySaleRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Daily sale retrieved", sale))
}

/// PUT `/daily-sales/{id}` - Amend a daily sale.
async fn update_daily_sale(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateDailySaleRequest>,
) -> ApiResult<Json<ApiResponse<daily_sales::Model>>> {
    let sale = DailySaleRepository::new((*state.db).clone())
        .update(
            id,
            UpdateDailySaleInput {
                cash_total: payload.cash_total,
                card_total: payload.card_total,
                fuel_total: payload.fuel_total,
                safedrops_amount: payload.safedrops_amount,
                sale_status: payload.sale_status,
                notes: payload.notes,
            },
        )
        .await?;

    info!(daily_sale_id = %id, user_id = %auth.user_id(), "Daily sale amended");
    Ok(ok("Daily sale updated", sale))
}

/// GET `/daily-sales/{id}/safedrops` - Resolutions with the settlement position.
async fn list_safedrops(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<SafedropSummary>>> {
    let summary = SafedropRepository::new((*state.db).clone())
        .for_sale(id)
        .await?;
    Ok(ok("Safedrop resolutions retrieved", summary))
}

/// POST `/daily-sales/{id}/safedrops` - Move safedrop cash into an account.
async fn resolve_safedrop(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ResolveSafedropRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ResolvedSafedrop>>)> {
    let resolved = SafedropRepository::new((*state.db).clone())
        .resolve(ResolveSafedropInput {
            daily_sale_id: id,
            target_account_id: payload.target_account_id,
            amount: payload.amount,
            note: payload.note,
            created_by: auth.user_id(),
        })
        .await?;
    Ok(created("Safedrop resolved", resolved))
}
