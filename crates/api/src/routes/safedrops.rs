//! Cross-sale safedrop views.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Days, NaiveDate, Utc};
use serde::Deserialize;

use forecourt_db::{SafedropRepository, repositories::PendingSafedrop};
use forecourt_shared::AppError;

use crate::{
    AppState,
    error::ApiResult,
    middleware::AuthUser,
    response::{ApiResponse, ok},
};

/// Default look-back window of the pending summary.
const DEFAULT_WINDOW_DAYS: u64 = 30;

/// Creates the safedrop routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/safedrops/pending", get(pending_safedrops))
}

/// Date range of the pending summary; defaults to the last 30 days.
#[derive(Debug, Default, Deserialize)]
pub struct PendingQuery {
    /// First sale date (inclusive).
    pub from: Option<NaiveDate>,
    /// Last sale date (inclusive).
    pub to: Option<NaiveDate>,
}

/// GET `/safedrops/pending` - Sales whose safedrop is not fully resolved.
async fn pending_safedrops(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<PendingQuery>,
) -> ApiResult<Json<ApiResponse<Vec<PendingSafedrop>>>> {
    let to = query.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = query.from.unwrap_or_else(|| {
        to.checked_sub_days(Days::new(DEFAULT_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN)
    });
    if from > to {
        return Err(AppError::validation("from", "The start date must not be after the end date").into());
    }

    let pending = SafedropRepository::new((*state.db).clone())
        .pending(from, to)
        .await?;
    Ok(ok("Pending safedrops retrieved", pending))
}
