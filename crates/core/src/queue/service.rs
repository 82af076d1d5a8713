//! Queue service
//!
//! Single periodic worker model: `process_queue` drains due jobs through
//! [`SyncService`] and then re-arms retryable failed jobs with exponential
//! backoff.
//! Claims are conditional so an accidental second worker skips jobs it
//! lost the race for instead of syncing them twice.

use std::sync::Arc;

use evosync_common::Clock;
use evosync_domain::constants::{
    COMPLETED_JOB_RETENTION_DAYS, DEFAULT_JOB_PRIORITY, QUEUE_ERROR_MISSING_CREDENTIALS,
    QUEUE_RESULT_ALREADY_SYNCED,
};
use evosync_domain::{
    JobStatus, QueueConfig, QueueJob, QueueRunSummary, QueueStats, Result, SyncOutcome,
};
use tracing::{debug, info, instrument, warn};

use super::ports::QueueRepository;
use crate::audit::AuditLogger;
use crate::sync::SyncService;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_DAY: i64 = 86_400;

/// Minutes to wait before the next try of a job that has failed
/// `attempts` times: `base`, `2·base`, `4·base`, ...
pub fn retry_delay_minutes(base_minutes: i64, attempts: i64) -> i64 {
    let exponent = u32::try_from(attempts.saturating_sub(1).clamp(0, 16)).unwrap_or(0);
    base_minutes.saturating_mul(1_i64 << exponent)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSettings {
    pub batch_size: u32,
    pub retry_batch_size: u32,
    pub max_attempts: i64,
    pub base_retry_minutes: i64,
    pub completed_retention_days: u32,
    /// Credentials present or simulation mode on.
    pub api_ready: bool,
}

impl QueueSettings {
    pub fn from_config(config: &QueueConfig, api_ready: bool) -> Self {
        Self {
            batch_size: config.batch_size,
            retry_batch_size: config.retry_batch_size,
            max_attempts: config.max_attempts,
            base_retry_minutes: config.base_retry_minutes,
            completed_retention_days: config.completed_retention_days,
            api_ready,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self::from_config(&QueueConfig::default(), true)
    }
}

pub struct QueueService {
    repository: Arc<dyn QueueRepository>,
    sync: Arc<SyncService>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
    settings: QueueSettings,
}

impl QueueService {
    pub fn new(
        repository: Arc<dyn QueueRepository>,
        sync: Arc<SyncService>,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
        settings: QueueSettings,
    ) -> Self {
        Self { repository, sync, audit, clock, settings }
    }

    pub const fn settings(&self) -> &QueueSettings {
        &self.settings
    }

    /// Enqueue a sync for `order_id` (default priority, due now).
    ///
    /// # Errors
    /// Storage faults.
    pub async fn add_job(&self, order_id: i64) -> Result<i64> {
        self.add_job_with(order_id, DEFAULT_JOB_PRIORITY, None).await
    }

    /// # Errors
    /// Storage faults.
    pub async fn add_job_with(&self, order_id: i64, priority: i64, scheduled_at: Option<i64>) -> Result<i64> {
        let now = self.clock.now_unix();
        let job_id = self
            .repository
            .insert(order_id, priority, scheduled_at.unwrap_or(now), now)
            .await?;
        debug!(job_id, order_id, priority, "job enqueued");
        self.audit.log_info(&format!("Order added to sync queue (job #{job_id})"), None, Some(order_id)).await;
        Ok(job_id)
    }

    /// One worker pass: due pending jobs, then the retry sweep.
    ///
    /// # Errors
    /// Storage faults while reading or updating the queue.
    #[instrument(skip(self))]
    pub async fn process_queue(&self) -> Result<QueueRunSummary> {
        let now = self.clock.now_unix();
        let mut summary = QueueRunSummary::default();

        for job in self.repository.due_pending(now, self.settings.batch_size).await? {
            if !self.repository.claim(job.id, now).await? {
                debug!(job_id = job.id, "job claimed elsewhere, skipping");
                continue;
            }
            summary.processed += 1;
            if self.process_job(&job).await? {
                summary.completed += 1;
            } else {
                summary.failed += 1;
            }
        }

        summary.rescheduled = self.retry_failed_jobs().await?;
        if summary.processed > 0 || summary.rescheduled > 0 {
            info!(
                processed = summary.processed,
                completed = summary.completed,
                failed = summary.failed,
                rescheduled = summary.rescheduled,
                "queue pass finished"
            );
        }
        Ok(summary)
    }

    /// Returns whether the job completed.
    ///
    /// Review issues, resolution failures, rejected payloads and missing
    /// credentials fail the job for good; only transient errors are left
    /// for the retry sweep.
    async fn process_job(&self, job: &QueueJob) -> Result<bool> {
        if self.sync.is_synced(job.order_id).await? {
            self.complete_job(job, QUEUE_RESULT_ALREADY_SYNCED).await?;
            return Ok(true);
        }
        if !self.settings.api_ready {
            self.fail_job(job, QUEUE_ERROR_MISSING_CREDENTIALS, false).await?;
            return Ok(false);
        }

        match self.sync.sync_order(job.order_id, false).await {
            Ok(SyncOutcome::AlreadySynced { .. }) => {
                self.complete_job(job, QUEUE_RESULT_ALREADY_SYNCED).await?;
                Ok(true)
            }
            Ok(outcome @ SyncOutcome::Synced { .. }) => {
                self.complete_job(job, &outcome.message()).await?;
                Ok(true)
            }
            Ok(outcome) => {
                self.fail_job(job, &outcome.message(), outcome.is_retryable()).await?;
                Ok(false)
            }
            Err(err) => {
                self.fail_job(job, &err.user_message(), err.is_transient()).await?;
                Ok(false)
            }
        }
    }

    async fn complete_job(&self, job: &QueueJob, result: &str) -> Result<()> {
        self.repository.complete(job.id, self.clock.now_unix(), result).await?;
        self.audit
            .log_info(&format!("Queue job #{} completed: {result}", job.id), None, Some(job.order_id))
            .await;
        Ok(())
    }

    async fn fail_job(&self, job: &QueueJob, error: &str, retryable: bool) -> Result<()> {
        warn!(job_id = job.id, order_id = job.order_id, error = %error, retryable, "queue job failed");
        self.repository.fail(job.id, self.clock.now_unix(), error, retryable).await?;
        self.audit
            .log_error(&format!("Queue job #{} failed: {error}", job.id), None, Some(job.order_id))
            .await;
        Ok(())
    }

    /// Re-arm retryable failed jobs that still have attempts left.
    ///
    /// # Errors
    /// Storage faults.
    pub async fn retry_failed_jobs(&self) -> Result<u32> {
        let now = self.clock.now_unix();
        let jobs = self
            .repository
            .retryable_failed(self.settings.max_attempts, now, self.settings.retry_batch_size)
            .await?;

        let mut rescheduled = 0;
        for job in jobs {
            let delay = retry_delay_minutes(self.settings.base_retry_minutes, job.attempts);
            let scheduled_at = now + delay * SECONDS_PER_MINUTE;
            self.repository.reschedule(job.id, scheduled_at).await?;
            debug!(job_id = job.id, attempts = job.attempts, delay_minutes = delay, "job rescheduled");
            self.audit
                .log_info(
                    &format!("Queue job #{} scheduled for retry in {delay} minutes", job.id),
                    None,
                    Some(job.order_id),
                )
                .await;
            rescheduled += 1;
        }
        Ok(rescheduled)
    }

    /// # Errors
    /// Storage faults.
    pub async fn get_stats(&self) -> Result<QueueStats> {
        self.repository.stats().await
    }

    /// # Errors
    /// Storage faults.
    pub async fn pending_count(&self) -> Result<u64> {
        Ok(self.repository.stats().await?.pending)
    }

    /// # Errors
    /// Storage faults.
    pub async fn get_jobs(&self, status: Option<JobStatus>, limit: u32) -> Result<Vec<QueueJob>> {
        self.repository.list(status, limit.max(1)).await
    }

    /// # Errors
    /// Storage faults.
    pub async fn get_latest_job_for_order(&self, order_id: i64) -> Result<Option<QueueJob>> {
        self.repository.latest_for_order(order_id).await
    }

    /// Cancel a job that has not started. Returns `false` otherwise.
    ///
    /// # Errors
    /// Storage faults.
    pub async fn cancel_job(&self, job_id: i64) -> Result<bool> {
        let cancelled = self.repository.delete_pending(job_id).await?;
        if cancelled {
            info!(job_id, "queue job cancelled");
        }
        Ok(cancelled)
    }

    /// Delete completed jobs older than `days` (default retention when `None`).
    ///
    /// # Errors
    /// Storage faults.
    pub async fn cleanup_completed(&self, days: Option<u32>) -> Result<u64> {
        let days = days.unwrap_or(if self.settings.completed_retention_days == 0 {
            COMPLETED_JOB_RETENTION_DAYS
        } else {
            self.settings.completed_retention_days
        });
        let cutoff = self.clock.now_unix() - i64::from(days) * SECONDS_PER_DAY;
        let deleted = self.repository.delete_completed_before(cutoff).await?;
        if deleted > 0 {
            info!(deleted, days, "completed queue jobs removed");
        }
        Ok(deleted)
    }
}
