//! Archive, restore and purge for every lifecycle-managed entity.
//!
//! Entities opt in by implementing [`SoftDeletable`]. The generic operations
//! lock the row, run the pure transition from `forecourt_core::lifecycle`,
//! give the entity a hook to keep derived state (account balances) in step,
//! and write the new status in one database transaction.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter,
    TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tracing::info;
use uuid::Uuid;

use forecourt_core::lifecycle::{self, LifecycleAction, LifecycleError, RecordStatus as CoreStatus};
use forecourt_shared::AppError;

use super::query::for_update;
use crate::entities::sea_orm_active_enums::RecordStatus;

/// Error types shared by the CRUD repositories.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Record does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource name.
        resource: &'static str,
        /// Requested ID.
        id: Uuid,
    },

    /// A unique value is already taken.
    #[error("{0}")]
    Duplicate(String),

    /// Input breaks a business rule.
    #[error("{message}")]
    Invalid {
        /// Offending request field.
        field: &'static str,
        /// Human-readable message.
        message: String,
    },

    /// Lifecycle transition refused.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RecordError {
    /// Builds a not-found error for `resource`.
    #[must_use]
    pub const fn not_found(resource: &'static str, id: Uuid) -> Self {
        Self::NotFound { resource, id }
    }

    /// Builds a rule violation on `field`.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound { .. } => Self::NotFound(err.to_string()),
            RecordError::Duplicate(message) => Self::Conflict(message),
            RecordError::Invalid { field, message } => Self::validation(field, message),
            RecordError::Lifecycle(e) => Self::Conflict(e.to_string()),
            RecordError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// An entity with the `status`/`archived_at` lifecycle columns.
#[async_trait]
pub trait SoftDeletable: EntityTrait<Model: Sync> {
    /// Resource name used in messages and logs.
    const RESOURCE: &'static str;

    /// Primary key column.
    fn id_column() -> Self::Column;
    /// `status` column.
    fn status_column() -> Self::Column;
    /// `archived_at` column.
    fn archived_at_column() -> Self::Column;
    /// `updated_at` column.
    fn updated_at_column() -> Self::Column;
    /// Current status of a loaded row.
    fn status_of(model: &Self::Model) -> CoreStatus;

    /// Number of rows that block a purge.
    async fn count_dependents(_txn: &DatabaseTransaction, _id: Uuid) -> Result<u64, DbErr> {
        Ok(0)
    }

    /// Runs inside the transaction before the status is written.
    async fn on_transition(
        _txn: &DatabaseTransaction,
        _model: &Self::Model,
        _action: LifecycleAction,
    ) -> Result<(), RecordError> {
        Ok(())
    }
}

/// Loads a row by id, or `NotFound`.
pub(crate) async fn find<E: SoftDeletable, C: sea_orm::ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<E::Model, RecordError> {
    E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or(RecordError::not_found(E::RESOURCE, id))
}

/// Loads and locks a row by id, or `NotFound`.
pub(crate) async fn find_locked<E: SoftDeletable>(
    txn: &DatabaseTransaction,
    id: Uuid,
) -> Result<E::Model, RecordError> {
    use sea_orm::ConnectionTrait;

    for_update(E::find(), txn.get_database_backend())
        .filter(E::id_column().eq(id))
        .one(txn)
        .await?
        .ok_or(RecordError::not_found(E::RESOURCE, id))
}

/// Loads a row that must be active, or `NotFound` when archived.
pub(crate) async fn find_active<E: SoftDeletable, C: sea_orm::ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<E::Model, RecordError> {
    let model = find::<E, C>(db, id).await?;
    if E::status_of(&model) == CoreStatus::Archived {
        return Err(RecordError::not_found(E::RESOURCE, id));
    }
    Ok(model)
}

/// Archives an active record.
///
/// # Errors
///
/// Returns `NotFound`, `Lifecycle(InvalidTransition)` or a hook error.
pub async fn archive<E: SoftDeletable>(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<E::Model, RecordError> {
    change_status::<E>(db, id, LifecycleAction::Archive).await
}

/// Restores an archived record.
///
/// # Errors
///
/// Returns `NotFound`, `Lifecycle(InvalidTransition)` or a hook error.
pub async fn restore<E: SoftDeletable>(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<E::Model, RecordError> {
    change_status::<E>(db, id, LifecycleAction::Restore).await
}

/// Permanently deletes a record nothing depends on.
///
/// # Errors
///
/// Returns `NotFound`, `Lifecycle(HasDependents)` or a hook error.
pub async fn purge<E: SoftDeletable>(db: &DatabaseConnection, id: Uuid) -> Result<(), RecordError> {
    let txn = db.begin().await?;

    let model = find_locked::<E>(&txn, id).await?;
    let dependents = E::count_dependents(&txn, id).await?;
    lifecycle::purge(dependents)?;
    E::on_transition(&txn, &model, LifecycleAction::Purge).await?;

    E::delete_many()
        .filter(E::id_column().eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(resource = E::RESOURCE, %id, "Record purged");
    Ok(())
}

async fn change_status<E: SoftDeletable>(
    db: &DatabaseConnection,
    id: Uuid,
    action: LifecycleAction,
) -> Result<E::Model, RecordError> {
    let txn = db.begin().await?;

    let model = find_locked::<E>(&txn, id).await?;
    let current = E::status_of(&model);
    let next = match action {
        LifecycleAction::Restore => lifecycle::restore(current)?,
        LifecycleAction::Archive | LifecycleAction::Purge => lifecycle::archive(current)?,
    };
    E::on_transition(&txn, &model, action).await?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let archived_at = (next == CoreStatus::Archived).then_some(now);
    E::update_many()
        .col_expr(E::status_column(), Expr::value(RecordStatus::from(next)))
        .col_expr(E::archived_at_column(), Expr::value(archived_at))
        .col_expr(E::updated_at_column(), Expr::value(now))
        .filter(E::id_column().eq(id))
        .exec(&txn)
        .await?;

    let updated = find::<E, _>(&txn, id).await?;
    txn.commit().await?;

    info!(resource = E::RESOURCE, %id, %action, "Record lifecycle changed");
    Ok(updated)
}
