//! Outbox worker and token refresher.
//!
//! Both loops run as their own Tokio tasks and stop when the shutdown
//! channel flips to `true`. A job in flight when shutdown arrives finishes
//! its attempt first.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info, warn};

use forecourt_core::retry::RetryPolicy;
use forecourt_db::{SyncJobRepository, entities::sea_orm_active_enums::SyncJobStatus};
use forecourt_shared::config::SyncConfig;

use crate::error::SyncError;
use crate::oauth::OAuthClient;
use crate::sheets::PriceSink;

/// Outcome counts of one poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Jobs delivered.
    pub succeeded: usize,
    /// Jobs whose price no longer exists.
    pub skipped: usize,
    /// Jobs scheduled for another attempt.
    pub retried: usize,
    /// Jobs that exhausted their attempts.
    pub failed: usize,
}

/// Drains the fuel price outbox into a [`PriceSink`].
pub struct SyncWorker {
    jobs: SyncJobRepository,
    sink: Arc<dyn PriceSink>,
    policy: RetryPolicy,
    batch_size: u64,
    poll_interval: Duration,
}

impl SyncWorker {
    /// Creates a worker with an explicit retry policy.
    #[must_use]
    pub fn new(
        jobs: SyncJobRepository,
        sink: Arc<dyn PriceSink>,
        policy: RetryPolicy,
        batch_size: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            jobs,
            sink,
            policy,
            batch_size,
            poll_interval,
        }
    }

    /// Creates a worker from the `sync` configuration section.
    #[must_use]
    pub fn from_config(jobs: SyncJobRepository, sink: Arc<dyn PriceSink>, config: &SyncConfig) -> Self {
        Self::new(
            jobs,
            sink,
            RetryPolicy::from_secs(config.max_attempts, &config.backoff_secs),
            config.batch_size,
            Duration::from_secs(config.poll_interval_secs),
        )
    }

    /// Processes every job due at `now`, one at a time.
    ///
    /// # Errors
    ///
    /// Returns an error only when outbox bookkeeping fails; push failures are
    /// recorded on the job.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<WorkerStats, SyncError> {
        let mut stats = WorkerStats::default();

        for job in self.jobs.due(now, self.batch_size).await? {
            let job_id = job.id;
            let fuel_price_id = job.fuel_price_id;

            let Some(price) = self.jobs.fuel_price(&job).await? else {
                info!(%job_id, %fuel_price_id, "Fuel price no longer exists, sync skipped");
                self.jobs.mark_succeeded(job, now).await?;
                stats.skipped += 1;
                continue;
            };

            match self.sink.push(price.effective_date, &price.prices()).await {
                Ok(()) => {
                    self.jobs.mark_succeeded(job, now).await?;
                    info!(%job_id, %fuel_price_id, effective_date = %price.effective_date, "Fuel prices synced");
                    stats.succeeded += 1;
                }
                Err(err) => {
                    let message = err.to_string();
                    let job = self.jobs.record_failure(job, &message, &self.policy, now).await?;
                    if job.status == SyncJobStatus::Failed {
                        stats.failed += 1;
                    } else {
                        warn!(
                            %job_id,
                            %fuel_price_id,
                            attempts = job.attempts,
                            next_attempt_at = %job.next_attempt_at,
                            error = %message,
                            "Fuel price sync failed, will retry"
                        );
                        stats.retried += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Polls until `shutdown` becomes `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(poll_interval = ?self.poll_interval, "Sync worker started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(stats) if stats != WorkerStats::default() => debug!(?stats, "Sync poll finished"),
                        Ok(_) => {}
                        Err(err) => error!(error = %err, "Sync poll failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Sync worker stopped");
    }

    /// Spawns [`SyncWorker::run`] on the runtime.
    #[must_use]
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

/// Spawns the periodic token refresh. Failures are logged and retried on the
/// next tick; the cached token stays usable until it expires.
#[must_use]
pub fn spawn_token_refresher(
    oauth: Arc<OAuthClient>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = oauth.force_refresh().await {
                        error!(error = %err, "Google token refresh failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Token refresher stopped");
    })
}
