//! Application constants
//!
//! Fixed values shared by the sync engine, the queue and the Evosus client.

// Evosus API
pub const DEFAULT_EVOSUS_BASE_URL: &str = "https://cloud3.evosus.com/api";
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_MAX_RETRIES: u32 = 3;
pub const DEFAULT_API_BACKOFF_MS: u64 = 1_000;
pub const USER_AGENT: &str = concat!("evosync/", env!("CARGO_PKG_VERSION"));

// Order payload defaults
pub const DEFAULT_DISTRIBUTION_METHOD_ID: &str = "1";
pub const LEGACY_CUSTOMER_PREFIX: &str = "WC_";
pub const FALLBACK_ITEM_CODE_PREFIX: &str = "WC_";

// Validation
pub const MAX_SKU_SUGGESTIONS: usize = 3;

// Tax
pub const DEFAULT_TAX_TOLERANCE: f64 = 0.005;

// Queue
pub const DEFAULT_JOB_PRIORITY: i64 = 10;
pub const QUEUE_BATCH_SIZE: u32 = 10;
pub const QUEUE_RETRY_BATCH_SIZE: u32 = 5;
pub const QUEUE_MAX_ATTEMPTS: i64 = 3;
pub const QUEUE_BASE_RETRY_MINUTES: i64 = 5;
pub const COMPLETED_JOB_RETENTION_DAYS: u32 = 30;
pub const QUEUE_RESULT_ALREADY_SYNCED: &str = "Already synced";
pub const QUEUE_ERROR_MISSING_CREDENTIALS: &str = "Missing API credentials";

// Audit log
pub const LOG_RETENTION_DAYS: u32 = 90;
pub const MAX_LOG_QUERY_LIMIT: u32 = 1_000;
pub const REDACTED: &str = "[REDACTED]";

// Remote order lookup window for closed orders
pub const CLOSED_ORDER_LOOKBACK_DAYS: i64 = 90;

// Webhook
pub const WEBHOOK_SECRET_HEADER: &str = "X-Evosus-Secret";
pub const WEBHOOK_PATH: &str = "/evosus/webhook";
