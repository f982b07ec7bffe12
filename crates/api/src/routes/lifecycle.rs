//! Archive, restore and purge handlers shared by every lifecycle resource.
//!
//! Each resource mounts them with its entity type:
//! `DELETE /{res}/{id}`, `POST /{res}/{id}/restore`, `DELETE /{res}/{id}/force`.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use forecourt_db::repositories::{SoftDeletable, archive, purge, restore};

use crate::{
    AppState,
    error::ApiResult,
    middleware::AuthUser,
    response::{ApiResponse, ok},
};

/// Mounts the lifecycle triple for `E` under `base` (e.g. `/accounts`).
pub fn routes<E>(base: &str) -> Router<AppState>
where
    E: SoftDeletable,
    E::Model: Serialize + Send + 'static,
{
    Router::new()
        .route(&format!("{base}/{{id}}"), delete(archive_record::<E>))
        .route(&format!("{base}/{{id}}/restore"), post(restore_record::<E>))
        .route(&format!("{base}/{{id}}/force"), delete(purge_record::<E>))
}

async fn archive_record<E>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<E::Model>>>
where
    E: SoftDeletable,
    E::Model: Serialize,
{
    let model = archive::<E>(&state.db, id).await?;
    info!(resource = E::RESOURCE, %id, user_id = %auth.user_id(), "Record archived");
    Ok(ok(format!("{} archived", E::RESOURCE), model))
}

async fn restore_record<E>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<E::Model>>>
where
    E: SoftDeletable,
    E::Model: Serialize,
{
    let model = restore::<E>(&state.db, id).await?;
    info!(resource = E::RESOURCE, %id, user_id = %auth.user_id(), "Record restored");
    Ok(ok(format!("{} restored", E::RESOURCE), model))
}

async fn purge_record<E>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<()>>>
where
    E: SoftDeletable,
{
    auth.require_purge()?;
    purge::<E>(&state.db, id).await?;
    Ok(ok(format!("{} permanently deleted", E::RESOURCE), ()))
}
