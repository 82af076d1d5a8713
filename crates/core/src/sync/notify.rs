//! Sync outcome observers
//!
//! The orchestrator publishes one [`SyncEvent`] per terminal transition.
//! Observers run in registration order, after the state change has been
//! persisted; a slow observer delays the caller but cannot undo the sync.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_domain::Issue;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    SyncSucceeded { order_id: i64, order_number: String, evosus_order_id: String },
    NeedsReview { order_id: i64, order_number: String, issues: Vec<Issue> },
    SyncFailed { order_id: i64, order_number: String, message: String },
}

impl SyncEvent {
    pub const fn order_id(&self) -> i64 {
        match self {
            Self::SyncSucceeded { order_id, .. }
            | Self::NeedsReview { order_id, .. }
            | Self::SyncFailed { order_id, .. } => *order_id,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SyncSucceeded { .. } => "sync_succeeded",
            Self::NeedsReview { .. } => "needs_review",
            Self::SyncFailed { .. } => "sync_failed",
        }
    }
}

/// Receives sync outcomes (email, log, outbound webhook, ...)
#[async_trait]
pub trait SyncObserver: Send + Sync {
    async fn on_event(&self, event: &SyncEvent);
}

/// Ordered set of observers
#[derive(Clone, Default)]
pub struct NotifierList {
    observers: Vec<Arc<dyn SyncObserver>>,
}

impl NotifierList {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub async fn notify(&self, event: &SyncEvent) {
        debug!(order_id = event.order_id(), kind = event.kind(), observers = self.observers.len(), "dispatching sync event");
        for observer in &self.observers {
            observer.on_event(event).await;
        }
    }
}
