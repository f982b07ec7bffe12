//! Report routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;

use forecourt_core::reports::PayrollReport;
use forecourt_db::ReportRepository;

use crate::{
    AppState,
    error::ApiResult,
    middleware::AuthUser,
    response::{ApiResponse, ok},
};

/// Creates the report routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/payroll", get(payroll_report))
}

/// Reporting period of the payroll report.
#[derive(Debug, Deserialize)]
pub struct PayrollReportQuery {
    /// First pay date (inclusive).
    pub start_date: NaiveDate,
    /// Last pay date (inclusive).
    pub end_date: NaiveDate,
}

/// GET `/reports/payroll` - Per-employee totals for the period and year to date.
async fn payroll_report(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PayrollReportQuery>,
) -> ApiResult<Json<ApiResponse<PayrollReport>>> {
    let report = ReportRepository::new((*state.db).clone())
        .payroll(query.start_date, query.end_date)
        .await?;
    Ok(ok("Payroll report generated", report))
}
