//! Scheduler error types

use std::time::Duration;

use evosync_domain::EvosyncError;
use thiserror::Error;
use tokio::time::error::Elapsed;
use tokio_cron_scheduler::JobSchedulerError;

use crate::errors::InfraError;

/// Scheduler-specific errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler already running")]
    AlreadyRunning,

    #[error("Scheduler not running")]
    NotRunning,

    #[error("Failed to create scheduler")]
    CreationFailed {
        #[source]
        source: JobSchedulerError,
    },

    #[error("Failed to start scheduler")]
    StartFailed {
        #[source]
        source: JobSchedulerError,
    },

    #[error("Failed to stop scheduler")]
    StopFailed {
        #[source]
        source: JobSchedulerError,
    },

    /// Invalid cron expression or rejected registration.
    #[error("Failed to register job '{job}'")]
    JobRegistrationFailed {
        job: &'static str,
        #[source]
        source: JobSchedulerError,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: Elapsed,
    },

    #[error("Task join failed")]
    TaskJoinFailed(#[from] tokio::task::JoinError),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let evosync_err = match &err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                EvosyncError::InvalidInput(err.to_string())
            }
            SchedulerError::JobRegistrationFailed { source, .. } => {
                EvosyncError::Config(format!("{err}: {source}"))
            }
            _ => EvosyncError::Internal(err.to_string()),
        };
        InfraError(evosync_err)
    }
}

impl From<SchedulerError> for EvosyncError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
