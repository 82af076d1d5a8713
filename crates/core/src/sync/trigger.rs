//! Auto-sync on storefront status changes

use std::sync::Arc;

use evosync_domain::{OrderStatus, Result};
use tracing::debug;

use crate::orders::ports::OrderStore;
use crate::queue::QueueService;

/// Enqueues a sync when an order moves to `processing` or `completed`
pub struct AutoSyncTrigger {
    store: Arc<dyn OrderStore>,
    queue: Arc<QueueService>,
    enabled: bool,
}

impl AutoSyncTrigger {
    pub fn new(store: Arc<dyn OrderStore>, queue: Arc<QueueService>, enabled: bool) -> Self {
        Self { store, queue, enabled }
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the id of the enqueued job, if any.
    ///
    /// # Errors
    /// Storage faults.
    pub async fn on_status_changed(&self, order_id: i64, new_status: &str) -> Result<Option<i64>> {
        if !self.enabled {
            return Ok(None);
        }
        let triggers = new_status.parse::<OrderStatus>().is_ok_and(OrderStatus::triggers_auto_sync);
        if !triggers {
            return Ok(None);
        }
        if self.store.get_sync_record(order_id).await?.synced {
            debug!(order_id, "status change on synced order ignored");
            return Ok(None);
        }
        self.queue.add_job(order_id).await.map(Some)
    }
}
