//! Caller-side sync guard and operator use cases
//!
//! Every entry point that can push an order to Evosus goes through
//! [`SyncService::sync_order`], which refuses already-synced orders and
//! serialises concurrent attempts for the same order id.

use std::sync::Arc;

use dashmap::DashMap;
use evosync_domain::{
    CrossReference, EvosyncError, Order, Result, SyncOutcome, ValidationReport,
    VerificationOutcome,
};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::orchestrator::SyncOrchestrator;
use crate::audit::AuditLogger;
use crate::erp::ports::ErpClient;
use crate::orders::ports::OrderStore;
use crate::validation::OrderValidator;

pub struct SyncService {
    store: Arc<dyn OrderStore>,
    erp: Arc<dyn ErpClient>,
    orchestrator: Arc<SyncOrchestrator>,
    validator: Arc<OrderValidator>,
    audit: Arc<AuditLogger>,
    in_flight: DashMap<i64, Arc<Mutex<()>>>,
}

impl SyncService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        erp: Arc<dyn ErpClient>,
        orchestrator: Arc<SyncOrchestrator>,
        validator: Arc<OrderValidator>,
        audit: Arc<AuditLogger>,
    ) -> Self {
        Self { store, erp, orchestrator, validator, audit, in_flight: DashMap::new() }
    }

    /// Sync one order unless it is already synced.
    ///
    /// # Errors
    /// [`EvosyncError::NotFound`] for an unknown order; storage faults.
    #[instrument(skip(self))]
    pub async fn sync_order(&self, order_id: i64, skip_validation: bool) -> Result<SyncOutcome> {
        let lock = Arc::clone(self.in_flight.entry(order_id).or_default().value());
        let outcome = {
            let _guard = lock.lock().await;
            self.sync_locked(order_id, skip_validation).await
        };
        drop(lock);
        self.in_flight.remove_if(&order_id, |_, lock| Arc::strong_count(lock) == 1);
        outcome
    }

    async fn sync_locked(&self, order_id: i64, skip_validation: bool) -> Result<SyncOutcome> {
        let order = self.load_order(order_id).await?;
        let record = self.store.get_sync_record(order_id).await?;
        if record.synced {
            debug!(evosus_order_id = ?record.evosus_order_id, "order already synced, refusing");
            return Ok(SyncOutcome::AlreadySynced { evosus_order_id: record.evosus_order_id });
        }
        self.orchestrator.run(&order, skip_validation).await
    }

    /// # Errors
    /// Storage faults.
    pub async fn is_synced(&self, order_id: i64) -> Result<bool> {
        Ok(self.store.get_sync_record(order_id).await?.synced)
    }

    /// Validate without syncing or touching the review state.
    ///
    /// # Errors
    /// Unknown order, storage faults or Evosus being unreachable.
    pub async fn validate_order(&self, order_id: i64) -> Result<ValidationReport> {
        let order = self.load_order(order_id).await?;
        self.validator.validate(&order).await
    }

    /// Operator approval of a reviewed order.
    ///
    /// Re-validates first; if blocking issues remain they are stored again
    /// and returned. Otherwise the review flags are cleared and the order is
    /// synced with validation skipped.
    ///
    /// # Errors
    /// Unknown order, storage faults or Evosus being unreachable.
    #[instrument(skip(self))]
    pub async fn approve_order_for_sync(&self, order_id: i64) -> Result<SyncOutcome> {
        let order = self.load_order(order_id).await?;
        let mut record = self.store.get_sync_record(order_id).await?;
        if record.synced {
            return Ok(SyncOutcome::AlreadySynced { evosus_order_id: record.evosus_order_id });
        }

        let report = self.validator.validate(&order).await?;
        if !report.valid {
            warn!(issues = report.issues.len(), "approval refused, order still has blocking issues");
            if record.needs_review {
                record.review_issues.clone_from(&report.issues);
                self.store.save_sync_record(order_id, &record).await?;
            }
            return Ok(SyncOutcome::NeedsReview { issues: report.issues });
        }

        record.clear_review();
        self.store.save_sync_record(order_id, &record).await?;
        self.audit.log_info("Order approved for sync after review", None, Some(order_id)).await;
        info!("order approved, syncing");

        self.sync_order(order_id, true).await
    }

    /// Set the manual Evosus item code for one line; blank clears it.
    ///
    /// # Errors
    /// [`EvosyncError::NotFound`] when the order has no such line.
    pub async fn update_order_item_sku(&self, order_id: i64, item_id: i64, sku: &str) -> Result<()> {
        let sku = sku.trim();
        let value = (!sku.is_empty()).then_some(sku);
        if !self.store.set_item_sku_override(order_id, item_id, value).await? {
            return Err(EvosyncError::NotFound(format!("Item {item_id} on order {order_id}")));
        }

        let message = match value {
            Some(code) => format!("SKU override for item {item_id} set to {code}"),
            None => format!("SKU override for item {item_id} cleared"),
        };
        self.audit
            .log_info(&message, Some(&json!({ "item_id": item_id, "sku": value })), Some(order_id))
            .await;
        Ok(())
    }

    /// Compare the Evosus PO number of a synced order with its local number.
    ///
    /// # Errors
    /// Unknown order, storage faults or Evosus being unreachable.
    #[instrument(skip(self))]
    pub async fn verify_cross_reference(&self, order_id: i64) -> Result<VerificationOutcome> {
        let order = self.load_order(order_id).await?;
        let record = self.store.get_sync_record(order_id).await?;
        let Some(evosus_order_id) = record.evosus_order_id.filter(|_| record.synced) else {
            return Ok(VerificationOutcome::NotSynced);
        };

        let Some(remote) = self.erp.get_order(&evosus_order_id).await? else {
            self.audit
                .log_warning(
                    &format!("Evosus order {evosus_order_id} not found during verification"),
                    None,
                    Some(order_id),
                )
                .await;
            return Ok(VerificationOutcome::RemoteNotFound { evosus_order_id });
        };

        let evosus_po_number = remote.po_number.unwrap_or_default().trim().to_string();
        let verified = evosus_po_number == order.number.trim();
        let reference = CrossReference {
            verified,
            evosus_po_number,
            order_number: order.number,
            evosus_order_id,
        };

        if verified {
            self.audit.log_info("Cross-reference verified", Some(&json!(reference)), Some(order_id)).await;
        } else {
            self.audit.log_warning("Cross-reference mismatch", Some(&json!(reference)), Some(order_id)).await;
        }
        Ok(VerificationOutcome::Checked(reference))
    }

    async fn load_order(&self, order_id: i64) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| EvosyncError::NotFound(format!("Order {order_id}")))
    }
}
