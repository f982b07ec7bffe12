//! Read-only view of the spreadsheet sync outbox.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use forecourt_db::{
    SyncJobRepository,
    entities::{sea_orm_active_enums::SyncJobStatus, sync_jobs},
};
use forecourt_shared::types::PageRequest;

use crate::{
    AppState,
    error::ApiResult,
    middleware::AuthUser,
    response::{ApiResponse, ok, page},
};

/// Creates the sync job routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sync-jobs", get(list_sync_jobs))
        .route("/sync-jobs/{id}", get(get_sync_job))
}

/// Query filters for listing sync jobs.
#[derive(Debug, Default, Deserialize)]
pub struct ListSyncJobsQuery {
    /// `pending`, `succeeded` or `failed`.
    pub status: Option<SyncJobStatus>,
}

async fn list_sync_jobs(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListSyncJobsQuery>,
    Query(page_request): Query<PageRequest>,
) -> ApiResult<Json<ApiResponse<Vec<sync_jobs::Model>>>> {
    let jobs = SyncJobRepository::new((*state.db).clone())
        .list(query.status, &page_request)
        .await?;
    Ok(page("Sync jobs retrieved", jobs))
}

async fn get_sync_job(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<sync_jobs::Model>>> {
    let job = SyncJobRepository::new((*state.db).clone()).find(id).await?;
    Ok(ok("Sync job retrieved", job))
}
