//! Background scheduling
//!
//! Cron-driven queue processing and retention sweeps. Schedulers follow the
//! same runtime rules:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout wrapping on all async operations

pub mod error;
pub mod queue_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use queue_scheduler::{
    QueueScheduler, QueueSchedulerConfig, QueueWorker, RetentionSummary, ScheduledWork,
};
