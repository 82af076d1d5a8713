//! # Evosync Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories and the bundled storefront order store
//! - The retrying HTTP client and the Evosus API client (live or simulated)
//! - Configuration loading, tracing setup and notification observers
//! - The queue scheduler and the inbound webhook endpoint
//!
//! ## Architecture
//! - Implements traits defined in `evosync-core`
//! - Depends on `evosync-common`, `evosync-domain` and `evosync-core`
//! - Contains all "impure" code (I/O, network, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod notifications;
pub mod observability;
pub mod scheduling;
pub mod webhook;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use integrations::*;
pub use notifications::{AuditNotifier, NotificationPolicy, TracingNotifier};
pub use observability::init_tracing;
pub use scheduling::{QueueScheduler, QueueSchedulerConfig, QueueWorker};
pub use webhook::{WebhookServer, WebhookState};
