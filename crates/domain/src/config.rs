//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    COMPLETED_JOB_RETENTION_DAYS, DEFAULT_API_BACKOFF_MS, DEFAULT_API_MAX_RETRIES,
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_DISTRIBUTION_METHOD_ID, DEFAULT_EVOSUS_BASE_URL,
    DEFAULT_TAX_TOLERANCE, LOG_RETENTION_DAYS, MAX_LOG_QUERY_LIMIT, QUEUE_BASE_RETRY_MINUTES,
    QUEUE_BATCH_SIZE, QUEUE_MAX_ATTEMPTS, QUEUE_RETRY_BATCH_SIZE, USER_AGENT,
};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub evosus: EvosusConfig,
    pub sync: SyncConfig,
    pub queue: QueueConfig,
    pub logs: LogRetentionConfig,
    pub webhook: WebhookConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "evosync.db".to_string(), pool_size: 4 }
    }
}

/// Evosus API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvosusConfig {
    #[serde(skip_serializing)]
    pub company_sn: String,
    #[serde(skip_serializing)]
    pub ticket: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Retries after the first attempt (transport failures and 5xx only).
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    /// Answer every endpoint in-process instead of calling Evosus.
    pub test_mode: bool,
    pub user_agent: String,
}

impl EvosusConfig {
    /// Both credential parameters are present.
    pub fn has_credentials(&self) -> bool {
        !self.company_sn.trim().is_empty() && !self.ticket.trim().is_empty()
    }

    /// Whether calls can be made at all (real credentials or simulation).
    pub fn is_usable(&self) -> bool {
        self.test_mode || self.has_credentials()
    }
}

impl Default for EvosusConfig {
    fn default() -> Self {
        Self {
            company_sn: String::new(),
            ticket: String::new(),
            base_url: DEFAULT_EVOSUS_BASE_URL.to_string(),
            timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            max_retries: DEFAULT_API_MAX_RETRIES,
            base_backoff_ms: DEFAULT_API_BACKOFF_MS,
            test_mode: false,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// One row of the tax-rate → Evosus `SalesTax_PK` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxRateMapping {
    pub rate: f64,
    pub code: String,
}

impl TaxRateMapping {
    pub fn new(rate: f64, code: impl Into<String>) -> Self {
        Self { rate, code: code.into() }
    }
}

/// Sync behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Enqueue orders automatically when they move to processing/completed.
    pub auto_sync: bool,
    pub distribution_method_id: String,
    /// Checked in declaration order; first match within tolerance wins.
    pub tax_rates: Vec<TaxRateMapping>,
    pub tax_tolerance: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync: false,
            distribution_method_id: DEFAULT_DISTRIBUTION_METHOD_ID.to_string(),
            tax_rates: vec![
                TaxRateMapping::new(0.00, "1"),
                TaxRateMapping::new(0.05, "2"),
                TaxRateMapping::new(0.13, "7"),
                TaxRateMapping::new(0.14, "11"),
                TaxRateMapping::new(0.15, "8"),
            ],
            tax_tolerance: DEFAULT_TAX_TOLERANCE,
        }
    }
}

/// Queue worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub batch_size: u32,
    pub retry_batch_size: u32,
    pub max_attempts: i64,
    pub base_retry_minutes: i64,
    pub completed_retention_days: u32,
    /// Six-field cron expression driving `process_queue`.
    pub schedule: String,
    /// Cron expression for the retention sweep.
    pub cleanup_schedule: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: QUEUE_BATCH_SIZE,
            retry_batch_size: QUEUE_RETRY_BATCH_SIZE,
            max_attempts: QUEUE_MAX_ATTEMPTS,
            base_retry_minutes: QUEUE_BASE_RETRY_MINUTES,
            completed_retention_days: COMPLETED_JOB_RETENTION_DAYS,
            schedule: "0 * * * * *".to_string(),
            cleanup_schedule: "0 30 3 * * *".to_string(),
        }
    }
}

/// Audit log retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogRetentionConfig {
    pub retention_days: u32,
    pub max_query_limit: u32,
}

impl Default for LogRetentionConfig {
    fn default() -> Self {
        Self { retention_days: LOG_RETENTION_DAYS, max_query_limit: MAX_LOG_QUERY_LIMIT }
    }
}

/// Inbound webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub enabled: bool,
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Reject requests when no secret is configured instead of accepting them.
    pub require_secret: bool,
    pub bind: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            secret: None,
            require_secret: false,
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

/// Sync outcome notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub email: Option<String>,
    pub notify_success: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true, email: None, notify_success: false }
    }
}

/// Process logging (tracing subscriber)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
