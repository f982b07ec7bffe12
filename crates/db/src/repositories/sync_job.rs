//! Outbox of jobs for the background sync worker.
//!
//! Jobs are inserted in the same database transaction as the write that
//! triggers them, so a committed fuel price always has its push queued.
//! Delivery is at-least-once: a job stays `pending` until the worker records
//! its outcome, and a crashed worker picks it up again on the next poll.

use chrono::{DateTime, TimeDelta, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, prelude::DateTimeWithTimeZone,
};
use tracing::error;
use uuid::Uuid;

use forecourt_core::retry::{RetryDecision, RetryPolicy};
use forecourt_shared::types::{PageRequest, PageResponse};

use super::lifecycle::RecordError;
use super::query::{Sortable, paginate};
use crate::entities::{
    fuel_prices,
    sea_orm_active_enums::{SyncJobKind, SyncJobStatus},
    sync_jobs,
};

const SORTABLE: Sortable<sync_jobs::Column> = Sortable {
    columns: &[
        ("created_at", sync_jobs::Column::CreatedAt),
        ("next_attempt_at", sync_jobs::Column::NextAttemptAt),
        ("attempts", sync_jobs::Column::Attempts),
    ],
    default: "created_at",
    tie_breaker: sync_jobs::Column::Id,
};

/// Queues a spreadsheet push of a fuel price, due immediately.
pub(crate) async fn enqueue_price_push<C: ConnectionTrait>(
    db: &C,
    fuel_price_id: Uuid,
) -> Result<sync_jobs::Model, DbErr> {
    let now = Utc::now().into();
    sync_jobs::ActiveModel {
        id: Set(Uuid::now_v7()),
        kind: Set(SyncJobKind::FuelPricePush),
        fuel_price_id: Set(fuel_price_id),
        status: Set(SyncJobStatus::Pending),
        attempts: Set(0),
        next_attempt_at: Set(now),
        last_error: Set(None),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
}

/// Sync job repository.
#[derive(Debug, Clone)]
pub struct SyncJobRepository {
    db: DatabaseConnection,
}

impl SyncJobRepository {
    /// Creates a new sync job repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Pending jobs whose `next_attempt_at` has passed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn due(&self, now: DateTime<Utc>, limit: u64) -> Result<Vec<sync_jobs::Model>, DbErr> {
        let now: DateTimeWithTimeZone = now.into();
        sync_jobs::Entity::find()
            .filter(sync_jobs::Column::Status.eq(SyncJobStatus::Pending))
            .filter(sync_jobs::Column::NextAttemptAt.lte(now))
            .order_by_asc(sync_jobs::Column::NextAttemptAt)
            .order_by_asc(sync_jobs::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
    }

    /// The fuel price a job pushes, or `None` if it was purged.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn fuel_price(
        &self,
        job: &sync_jobs::Model,
    ) -> Result<Option<fuel_prices::Model>, DbErr> {
        fuel_prices::Entity::find_by_id(job.fuel_price_id)
            .one(&self.db)
            .await
    }

    /// Marks a job delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn mark_succeeded(
        &self,
        job: sync_jobs::Model,
        now: DateTime<Utc>,
    ) -> Result<sync_jobs::Model, DbErr> {
        let attempts = job.attempts + 1;
        let mut active: sync_jobs::ActiveModel = job.into();
        active.status = Set(SyncJobStatus::Succeeded);
        active.attempts = Set(attempts);
        active.last_error = Set(None);
        active.completed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        active.update(&self.db).await
    }

    /// Records a failed attempt and schedules a retry or gives up.
    ///
    /// A job that exhausts its attempts is marked `failed` and logged with its
    /// full context. The fuel price it refers to is never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails.
    pub async fn record_failure(
        &self,
        job: sync_jobs::Model,
        message: &str,
        policy: &RetryPolicy,
        now: DateTime<Utc>,
    ) -> Result<sync_jobs::Model, DbErr> {
        let attempts = job.attempts + 1;
        let decision = policy.after_failure(u32::try_from(attempts).unwrap_or(u32::MAX));

        let job_id = job.id;
        let fuel_price_id = job.fuel_price_id;
        let mut active: sync_jobs::ActiveModel = job.into();
        active.attempts = Set(attempts);
        active.last_error = Set(Some(message.to_string()));
        active.updated_at = Set(now.into());

        match decision {
            RetryDecision::RetryAfter(delay) => {
                let delay = TimeDelta::from_std(delay).unwrap_or_else(|_| TimeDelta::zero());
                active.next_attempt_at = Set((now + delay).into());
            }
            RetryDecision::GiveUp => {
                error!(
                    %job_id,
                    %fuel_price_id,
                    attempts,
                    last_error = message,
                    "Fuel price sync failed permanently"
                );
                active.status = Set(SyncJobStatus::Failed);
                active.completed_at = Set(Some(now.into()));
            }
        }

        active.update(&self.db).await
    }

    /// Lists jobs, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        status: Option<SyncJobStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<sync_jobs::Model>, RecordError> {
        let mut query = sync_jobs::Entity::find();
        if let Some(status) = status {
            query = query.filter(sync_jobs::Column::Status.eq(status));
        }
        Ok(paginate(&self.db, query, &SORTABLE, page).await?)
    }

    /// Finds a job by ID.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no job has the ID.
    pub async fn find(&self, id: Uuid) -> Result<sync_jobs::Model, RecordError> {
        sync_jobs::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RecordError::not_found("Sync job", id))
    }
}
