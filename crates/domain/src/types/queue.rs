//! Durable sync queue

use serde::{Deserialize, Serialize};

/// Queue job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

crate::impl_domain_status_conversions!(JobStatus {
    Pending => "pending",
    Processing => "processing",
    Completed => "completed",
    Failed => "failed",
});

/// One queued sync request for an order
///
/// Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueJob {
    pub id: i64,
    pub order_id: i64,
    pub status: JobStatus,
    pub priority: i64,
    pub attempts: i64,
    pub scheduled_at: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub result: Option<String>,
    pub error_message: Option<String>,
    pub created_at: i64,
    /// Cleared when the failure cannot be fixed by trying again
    /// (review issues, missing address data, missing credentials).
    #[serde(default = "retryable_by_default")]
    pub retryable: bool,
}

const fn retryable_by_default() -> bool {
    true
}

impl QueueJob {
    /// Whether the retry sweep may pick this job up again.
    pub const fn can_retry(&self, max_attempts: i64) -> bool {
        matches!(self.status, JobStatus::Failed) && self.retryable && self.attempts < max_attempts
    }
}

/// Job counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub failed: u64,
}

impl QueueStats {
    pub const fn total(&self) -> u64 {
        self.pending + self.processing + self.completed + self.failed
    }

    pub fn record(&mut self, status: JobStatus, count: u64) {
        match status {
            JobStatus::Pending => self.pending += count,
            JobStatus::Processing => self.processing += count,
            JobStatus::Completed => self.completed += count,
            JobStatus::Failed => self.failed += count,
        }
    }
}

/// What one `process_queue` pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRunSummary {
    pub processed: u32,
    pub completed: u32,
    pub failed: u32,
    pub rescheduled: u32,
}
