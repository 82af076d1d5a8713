//! # Evosync Core
//!
//! Order reconciliation and sync engine - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for Evosus, storage and the storefront
//! - Validation, customer resolution, tax mapping and order submission
//! - The sync orchestrator, its caller-side guard and the retry queue
//! - Webhook effects and notification observers
//!
//! ## Architecture Principles
//! - Only depends on `evosync-common` and `evosync-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Services are constructed explicitly and shared through `Arc`

pub mod audit;
pub mod customer;
pub mod erp;
pub mod orders;
pub mod queue;
pub mod sku;
pub mod submission;
pub mod sync;
pub mod validation;
pub mod webhook;

pub use audit::ports::LogRepository;
pub use audit::{ApiCallRecord, AuditLogger};
pub use customer::CustomerResolver;
pub use erp::ports::ErpClient;
pub use orders::ports::OrderStore;
pub use queue::ports::QueueRepository;
pub use queue::{retry_delay_minutes, QueueService, QueueSettings};
pub use sku::ports::SkuMappingRepository;
pub use sku::SkuMapper;
pub use submission::{OrderSubmitter, TaxCodeResolver};
pub use sync::notify::{NotifierList, SyncEvent, SyncObserver};
pub use sync::{AutoSyncTrigger, SyncOrchestrator, SyncReport, SyncReporter, SyncService};
pub use validation::OrderValidator;
pub use webhook::{parse_event, WebhookAuth, WebhookHandler, WebhookRejection};
