//! Port interface for audit log storage

use async_trait::async_trait;
use evosync_domain::{LogEntry, LogFilter, LogStat, Result};

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Append an entry, returning its id.
    async fn insert(&self, entry: &LogEntry) -> Result<i64>;

    /// Entries matching `filter`, newest first.
    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>>;

    /// Delete entries created before `cutoff` (unix seconds).
    async fn delete_older_than(&self, cutoff: i64) -> Result<u64>;

    /// Counts per (type, severity) for entries created at or after `since`.
    async fn stats_since(&self, since: i64) -> Result<Vec<LogStat>>;
}
