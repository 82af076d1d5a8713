//! Sync orchestration, its caller-side guard and operator reports

pub mod notify;
mod orchestrator;
mod reports;
mod service;
mod trigger;

pub use orchestrator::SyncOrchestrator;
pub use reports::{SyncReport, SyncReporter};
pub use service::SyncService;
pub use trigger::AutoSyncTrigger;
