//! Queue persistence port

use async_trait::async_trait;
use evosync_domain::{JobStatus, QueueJob, QueueStats, Result};

#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Insert a `pending` job and return its id.
    async fn insert(
        &self,
        order_id: i64,
        priority: i64,
        scheduled_at: i64,
        created_at: i64,
    ) -> Result<i64>;

    async fn get(&self, job_id: i64) -> Result<Option<QueueJob>>;

    /// Pending jobs due at `now`, priority desc then oldest first.
    async fn due_pending(&self, now: i64, limit: u32) -> Result<Vec<QueueJob>>;

    /// Move a job from `pending` to `processing`, bumping `attempts`.
    ///
    /// Returns `false` when the job was no longer pending (claimed by
    /// another worker or cancelled).
    async fn claim(&self, job_id: i64, now: i64) -> Result<bool>;

    async fn complete(&self, job_id: i64, now: i64, result: &str) -> Result<()>;

    /// Mark a job `failed`. With `retryable == false` the retry sweep
    /// never picks it up again.
    async fn fail(&self, job_id: i64, now: i64, error: &str, retryable: bool) -> Result<()>;

    /// Retryable failed jobs with `attempts < max_attempts` that are due,
    /// oldest first.
    async fn retryable_failed(&self, max_attempts: i64, now: i64, limit: u32) -> Result<Vec<QueueJob>>;

    /// Put a failed job back to `pending` at `scheduled_at`.
    async fn reschedule(&self, job_id: i64, scheduled_at: i64) -> Result<()>;

    async fn stats(&self) -> Result<QueueStats>;

    /// Newest first.
    async fn list(&self, status: Option<JobStatus>, limit: u32) -> Result<Vec<QueueJob>>;

    async fn latest_for_order(&self, order_id: i64) -> Result<Option<QueueJob>>;

    /// Delete a job that is still `pending`.
    async fn delete_pending(&self, job_id: i64) -> Result<bool>;

    /// Delete completed jobs finished before `cutoff`.
    async fn delete_completed_before(&self, cutoff: i64) -> Result<u64>;
}
