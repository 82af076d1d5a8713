//! Cron-driven queue worker and retention sweep.
//!
//! Two jobs share one [`JobScheduler`]: the queue pass (every minute by
//! default) and a daily retention sweep that prunes old audit entries and
//! completed queue jobs. Join handles are tracked, cancellation is explicit,
//! and every asynchronous operation is wrapped in a timeout.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use evosync_infra::scheduling::{QueueScheduler, QueueSchedulerConfig, QueueWorker};
//!
//! # async fn example(worker: Arc<QueueWorker>) -> evosync_infra::scheduling::SchedulerResult<()> {
//! let mut scheduler = QueueScheduler::new(QueueSchedulerConfig::default(), worker);
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use evosync_core::{AuditLogger, QueueService};
use evosync_domain::{Config, QueueRunSummary, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Rows removed by one retention sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionSummary {
    pub logs_deleted: u64,
    pub jobs_deleted: u64,
}

/// Work the scheduler triggers
#[async_trait]
pub trait ScheduledWork: Send + Sync {
    async fn process_queue(&self) -> Result<QueueRunSummary>;

    async fn run_retention(&self) -> Result<RetentionSummary>;
}

/// [`ScheduledWork`] backed by the queue service and audit logger
pub struct QueueWorker {
    queue: Arc<QueueService>,
    audit: Arc<AuditLogger>,
    log_retention_days: u32,
}

impl QueueWorker {
    pub fn new(queue: Arc<QueueService>, audit: Arc<AuditLogger>, log_retention_days: u32) -> Self {
        Self { queue, audit, log_retention_days }
    }
}

#[async_trait]
impl ScheduledWork for QueueWorker {
    async fn process_queue(&self) -> Result<QueueRunSummary> {
        self.queue.process_queue().await
    }

    async fn run_retention(&self) -> Result<RetentionSummary> {
        let logs_deleted = self.audit.cleanup_old_logs(self.log_retention_days).await?;
        let jobs_deleted = self.queue.cleanup_completed(None).await?;
        Ok(RetentionSummary { logs_deleted, jobs_deleted })
    }
}

/// Configuration for the queue scheduler.
#[derive(Debug, Clone)]
pub struct QueueSchedulerConfig {
    /// Cron expression (with seconds) for the queue pass.
    pub queue_cron: String,
    /// Cron expression for the retention sweep.
    pub retention_cron: String,
    /// Timeout applied to a single job execution.
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for QueueSchedulerConfig {
    fn default() -> Self {
        Self {
            queue_cron: "0 * * * * *".into(),
            retention_cron: "0 30 3 * * *".into(),
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl QueueSchedulerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            queue_cron: config.queue.schedule.clone(),
            retention_cron: config.queue.cleanup_schedule.clone(),
            ..Self::default()
        }
    }
}

/// Queue scheduler with explicit lifecycle management.
pub struct QueueScheduler {
    scheduler: Option<JobScheduler>,
    config: QueueSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    work: Arc<dyn ScheduledWork>,
    /// Held while a queue pass runs so overlapping ticks are skipped.
    pass_lock: Arc<Mutex<()>>,
}

impl QueueScheduler {
    pub fn new(config: QueueSchedulerConfig, work: Arc<dyn ScheduledWork>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            work,
            pass_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        self.monitor_handle = Some(tokio::spawn(Self::monitor_task(cancel)));

        info!(
            scheduler = "queue",
            event = "start",
            queue_cron = %self.config.queue_cron,
            retention_cron = %self.config.retention_cron,
            "queue scheduler started"
        );
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
            .await
            .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
            .map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!(scheduler = "queue", event = "stop", "queue scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;

        let queue_job = self.queue_job()?;
        let retention_job = self.retention_job()?;

        for (name, job) in [("queue", queue_job), ("retention", retention_job)] {
            let job_id = job.guid();
            scheduler
                .add(job)
                .await
                .map_err(|source| SchedulerError::JobRegistrationFailed { job: name, source })?;
            debug!(job = name, job_id = %job_id, "registered scheduled job");
        }
        Ok(scheduler)
    }

    fn queue_job(&self) -> SchedulerResult<Job> {
        let work = Arc::clone(&self.work);
        let pass_lock = Arc::clone(&self.pass_lock);
        let job_timeout = self.config.job_timeout;

        Job::new_async(self.config.queue_cron.as_str(), move |_id, _lock| {
            let work = Arc::clone(&work);
            let pass_lock = Arc::clone(&pass_lock);

            Box::pin(async move {
                let Ok(_guard) = pass_lock.try_lock() else {
                    debug!(scheduler = "queue", "previous queue pass still running, skipping tick");
                    return;
                };
                let started = Instant::now();

                match tokio::time::timeout(job_timeout, work.process_queue()).await {
                    Ok(Ok(summary)) => {
                        if summary.processed > 0 || summary.rescheduled > 0 {
                            info!(
                                scheduler = "queue",
                                processed = summary.processed,
                                completed = summary.completed,
                                failed = summary.failed,
                                rescheduled = summary.rescheduled,
                                elapsed_ms = started.elapsed().as_millis() as u64,
                                "queue pass finished"
                            );
                        }
                    }
                    Ok(Err(err)) => {
                        error!(scheduler = "queue", error = %err, "queue pass failed");
                    }
                    Err(_) => {
                        warn!(
                            scheduler = "queue",
                            event = "job_timeout",
                            timeout_secs = job_timeout.as_secs(),
                            "queue pass timed out"
                        );
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { job: "queue", source })
    }

    fn retention_job(&self) -> SchedulerResult<Job> {
        let work = Arc::clone(&self.work);
        let job_timeout = self.config.job_timeout;

        Job::new_async(self.config.retention_cron.as_str(), move |_id, _lock| {
            let work = Arc::clone(&work);

            Box::pin(async move {
                match tokio::time::timeout(job_timeout, work.run_retention()).await {
                    Ok(Ok(summary)) => info!(
                        scheduler = "retention",
                        logs_deleted = summary.logs_deleted,
                        jobs_deleted = summary.jobs_deleted,
                        "retention sweep finished"
                    ),
                    Ok(Err(err)) => error!(scheduler = "retention", error = %err, "retention sweep failed"),
                    Err(_) => warn!(
                        scheduler = "retention",
                        timeout_secs = job_timeout.as_secs(),
                        "retention sweep timed out"
                    ),
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { job: "retention", source })
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!(scheduler = "queue", event = "monitor_cancelled", "queue scheduler monitor cancelled");
    }
}

impl Drop for QueueScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(
                scheduler = "queue",
                event = "drop_cancel",
                "QueueScheduler dropped while running; cancelling tasks"
            );
            self.cancellation.cancel();
        }
    }
}
