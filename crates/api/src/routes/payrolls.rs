//! Payroll routes.

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
    PayrollRepository,
    entities::payrolls,
    repositories::{CreatePayrollInput, PayrollFilter},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ValidatedJson, non_negative_money},
    middleware::AuthUser,
    response::{ApiResponse, created, ok, page},
    routes::lifecycle,
};

/// Creates the payroll routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payrolls", get(list_payrolls).post(create_payroll))
        .route("/payrolls/{id}", get(get_payroll))
        .merge(lifecycle::routes::<payrolls::Entity>("/payrolls"))
}

/// Query filters for listing payrolls.
#[derive(Debug, Default, Deserialize)]
pub struct ListPayrollsQuery {
    /// Payrolls of one employee.
    pub employee_id: Option<Uuid>,
    /// First pay date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last pay date (inclusive).
    pub to: Option<NaiveDate>,
}

/// Request body for recording a payroll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePayrollRequest {
    /// Employee paid.
    pub employee_id: Uuid,
    /// First day worked.
    pub period_start: NaiveDate,
    /// Last day worked.
    pub period_end: NaiveDate,
    /// Day the pay went out.
    pub pay_date: NaiveDate,
    /// Hours in the period.
    #[validate(custom(function = "non_negative_money"))]
    pub hours_worked: Decimal,
    /// Pay before deductions.
    #[validate(custom(function = "non_negative_money"))]
    pub gross_pay: Decimal,
    /// Withheld amounts; net pay is gross minus deductions.
    #[validate(custom(function = "non_negative_money"))]
    pub deductions: Decimal,
}

async fn list_payrolls(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListPayrollsQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<payrolls::Model>>>> {
    let filter = PayrollFilter {
        employee_id: query.employee_id,
        from: query.from,
        to: query.to,
    };
    let payrolls = PayrollRepository::new((*state.db).clone())
        .list(filter, &page_request)
        .await?;
    Ok(page("Payrolls retrieved", payrolls))
}

async fn create_payroll(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePayrollRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<payrolls::Model>>)> {
    let payroll = PayrollRepository::new((*state.db).clone())
        .create(CreatePayrollInput {
            employee_id: payload.employee_id,
            period_start: payload.period_start,
            period_end: payload.period_end,
            pay_date: payload.pay_date,
            hours_worked: payload.hours_worked,
            gross_pay: payload.gross_pay,
            deductions: payload.deductions,
        })
        .await?;

    info!(
        payroll_id = %payroll.id,
        employee_id = %payroll.employee_id,
        user_id = %auth.user_id(),
        "Payroll recorded"
    );
    Ok(created("Payroll created", payroll))
}

async fn get_payroll(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<payrolls::Model>>> {
    let payroll = PayrollRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Payroll retrieved", payroll))
}
