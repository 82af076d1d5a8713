//! Domain types and models

pub mod audit;
pub mod evosus;
pub mod order;
pub mod queue;
pub mod sku;
pub mod sync;
pub mod webhook;

pub use audit::{LogEntry, LogFilter, LogSeverity, LogStat, LogType};
pub use evosus::{
    CustomerAddress, CustomerQuery, InventoryItem, NewCustomer, NewOrder, OrderLine, RemoteOrder,
};
pub use order::{Address, LineItem, Order, OrderStatus};
pub use queue::{JobStatus, QueueJob, QueueRunSummary, QueueStats};
pub use sku::{CsvImportReport, SkuMapping};
pub use sync::{
    CrossReference, CustomerResolution, Issue, IssueSeverity, IssueType, ReviewSummary,
    SkuSuggestion, SubmissionResult, SyncOutcome, SyncRecord, SyncedOrderSummary,
    ValidationReport, VerificationOutcome,
};
pub use webhook::{WebhookEvent, WebhookResponse};
