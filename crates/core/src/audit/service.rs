//! Audit logger service
//!
//! Every entry is written through here so payload redaction happens in one
//! place. Writes are best-effort: a storage failure is traced and dropped,
//! never surfaced to the operation being audited.

use std::sync::Arc;
use std::time::Duration;

use evosync_common::{redact_text, redacted_json, Clock};
use evosync_domain::constants::MAX_LOG_QUERY_LIMIT;
use evosync_domain::{LogEntry, LogFilter, LogSeverity, LogStat, LogType, Result};
use serde_json::{json, Value};
use tracing::{debug, error};

use super::ports::LogRepository;

const SECONDS_PER_DAY: i64 = 86_400;

/// One remote call, as seen by the API client
#[derive(Debug, Clone, Default)]
pub struct ApiCallRecord {
    pub endpoint: String,
    pub method: String,
    pub request: Option<Value>,
    pub response: Option<Value>,
    /// `None` when no HTTP response was received.
    pub status_code: Option<u16>,
    pub duration: Duration,
    /// Transport error or remote `ER` message.
    pub error: Option<String>,
    /// 1-based try number within one logical call; 0 when not tracked.
    pub attempt: u32,
}

/// Structured, redacted audit trail
pub struct AuditLogger {
    repository: Arc<dyn LogRepository>,
    clock: Arc<dyn Clock>,
    max_query_limit: u32,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn LogRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock, max_query_limit: MAX_LOG_QUERY_LIMIT }
    }

    #[must_use]
    pub fn with_max_query_limit(mut self, limit: u32) -> Self {
        self.max_query_limit = limit.max(1);
        self
    }

    pub async fn log_api_call(&self, call: ApiCallRecord) {
        let failed = call.error.is_some() || call.status_code.map_or(true, |code| code >= 400);
        let severity = if failed { LogSeverity::Error } else { LogSeverity::Info };
        let endpoint = redact_text(&call.endpoint);
        let message = match &call.error {
            Some(err) => format!("{} {endpoint} failed: {}", call.method, redact_text(err)),
            None => format!("{} {endpoint}", call.method),
        };

        let mut entry = LogEntry::new(LogType::ApiCall, severity, message, self.now());
        entry.endpoint = Some(endpoint);
        entry.method = Some(call.method);
        entry.request_data = call.request.as_ref().map(redacted_json);
        entry.response_data = call.response.as_ref().map(redacted_json);
        entry.status_code = call.status_code.map(i64::from);
        entry.execution_time = Some(call.duration.as_secs_f64());
        if call.attempt > 0 {
            entry.context = Some(json!({ "attempt": call.attempt }).to_string());
        }
        self.record(entry).await;
    }

    pub async fn log_error(&self, message: &str, context: Option<&Value>, order_id: Option<i64>) {
        self.log(LogType::Error, LogSeverity::Error, message, context, order_id).await;
    }

    pub async fn log_warning(&self, message: &str, context: Option<&Value>, order_id: Option<i64>) {
        self.log(LogType::Warning, LogSeverity::Warning, message, context, order_id).await;
    }

    pub async fn log_info(&self, message: &str, context: Option<&Value>, order_id: Option<i64>) {
        self.log(LogType::Info, LogSeverity::Info, message, context, order_id).await;
    }

    /// Record the terminal result of a sync attempt.
    pub async fn log_sync(
        &self,
        order_id: i64,
        success: bool,
        message: &str,
        evosus_order_id: Option<&str>,
    ) {
        let severity = if success { LogSeverity::Info } else { LogSeverity::Error };
        let mut entry = LogEntry::new(LogType::Sync, severity, redact_text(message), self.now())
            .with_order(Some(order_id));
        entry.evosus_order_id = evosus_order_id.map(str::to_string);
        self.record(entry).await;
    }

    /// Entries matching `filter`; the limit is clamped to `1..=max`.
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let mut filter = filter.clone();
        filter.limit = filter.limit.clamp(1, self.max_query_limit);
        self.repository.query(&filter).await
    }

    /// Delete entries older than `days` days; returns the number removed.
    pub async fn cleanup_old_logs(&self, days: u32) -> Result<u64> {
        let cutoff = self.now() - i64::from(days) * SECONDS_PER_DAY;
        let deleted = self.repository.delete_older_than(cutoff).await?;
        debug!(days, deleted, "audit log retention sweep");
        Ok(deleted)
    }

    /// Entry counts grouped by type and severity over the last `days` days.
    pub async fn get_stats(&self, days: u32) -> Result<Vec<LogStat>> {
        let since = self.now() - i64::from(days) * SECONDS_PER_DAY;
        self.repository.stats_since(since).await
    }

    async fn log(
        &self,
        log_type: LogType,
        severity: LogSeverity,
        message: &str,
        context: Option<&Value>,
        order_id: Option<i64>,
    ) {
        let entry = LogEntry::new(log_type, severity, redact_text(message), self.now())
            .with_order(order_id)
            .with_context(context.map(redacted_json));
        self.record(entry).await;
    }

    async fn record(&self, entry: LogEntry) {
        if let Err(err) = self.repository.insert(&entry).await {
            error!(error = %err, log_type = %entry.log_type, "failed to write audit entry");
        }
    }

    fn now(&self) -> i64 {
        self.clock.now_unix()
    }
}
