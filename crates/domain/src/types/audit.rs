//! Audit trail entries
//!
//! Entries are append-only. Request and response payloads are redacted before
//! they reach this type.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    ApiCall,
    Error,
    Sync,
    Warning,
    Info,
}

crate::impl_domain_status_conversions!(LogType {
    ApiCall => "api_call",
    Error => "error",
    Sync => "sync",
    Warning => "warning",
    Info => "info",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Info,
    Warning,
    Error,
}

crate::impl_domain_status_conversions!(LogSeverity {
    Info => "info",
    Warning => "warning",
    Error => "error",
});

/// One audit row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Assigned by storage; `None` before insert.
    pub id: Option<i64>,
    pub log_type: LogType,
    pub severity: LogSeverity,
    pub message: String,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub request_data: Option<String>,
    pub response_data: Option<String>,
    pub status_code: Option<i64>,
    /// Seconds.
    pub execution_time: Option<f64>,
    pub context: Option<String>,
    pub order_id: Option<i64>,
    pub evosus_order_id: Option<String>,
    /// Unix seconds.
    pub created_at: i64,
}

impl LogEntry {
    pub fn new(
        log_type: LogType,
        severity: LogSeverity,
        message: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: None,
            log_type,
            severity,
            message: message.into(),
            endpoint: None,
            method: None,
            request_data: None,
            response_data: None,
            status_code: None,
            execution_time: None,
            context: None,
            order_id: None,
            evosus_order_id: None,
            created_at,
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order_id: Option<i64>) -> Self {
        self.order_id = order_id;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

/// Query over the audit trail; results are newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilter {
    pub log_type: Option<LogType>,
    pub severity: Option<LogSeverity>,
    pub order_id: Option<i64>,
    /// Inclusive lower bound, unix seconds.
    pub since: Option<i64>,
    /// Inclusive upper bound, unix seconds.
    pub until: Option<i64>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for LogFilter {
    fn default() -> Self {
        Self {
            log_type: None,
            severity: None,
            order_id: None,
            since: None,
            until: None,
            limit: 100,
            offset: 0,
        }
    }
}

/// Count of entries for one (type, severity) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStat {
    pub log_type: LogType,
    pub severity: LogSeverity,
    pub count: u64,
}
