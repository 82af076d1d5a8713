//! Sync orchestrator
//!
//! validate → resolve customer → tax code → submit → persist. Validation
//! errors park the order in review; any failure after that leaves the
//! sync record as it was. Failures are flagged retryable only when the
//! underlying error is transient (transport, 5xx). Refusing already-synced
//! orders is the caller's job (see [`super::SyncService`]).

use std::sync::Arc;

use evosync_common::Clock;
use evosync_domain::{Order, Result, SyncOutcome, ValidationReport};
use serde_json::json;
use tracing::{info, instrument, warn};

use super::notify::{NotifierList, SyncEvent};
use crate::audit::AuditLogger;
use crate::customer::CustomerResolver;
use crate::orders::ports::OrderStore;
use crate::submission::{OrderSubmitter, TaxCodeResolver};
use crate::validation::OrderValidator;

const REVIEW_NOTE: &str = "Evosus Sync: Order flagged for review due to validation issues.";

pub struct SyncOrchestrator {
    store: Arc<dyn OrderStore>,
    validator: Arc<OrderValidator>,
    resolver: Arc<CustomerResolver>,
    tax: TaxCodeResolver,
    submitter: Arc<OrderSubmitter>,
    audit: Arc<AuditLogger>,
    notifiers: NotifierList,
    clock: Arc<dyn Clock>,
}

impl SyncOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn OrderStore>,
        validator: Arc<OrderValidator>,
        resolver: Arc<CustomerResolver>,
        tax: TaxCodeResolver,
        submitter: Arc<OrderSubmitter>,
        audit: Arc<AuditLogger>,
        notifiers: NotifierList,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, validator, resolver, tax, submitter, audit, notifiers, clock }
    }

    /// Run one sync attempt for `order`.
    ///
    /// # Errors
    /// Only when the order store cannot persist the outcome; every remote
    /// failure is reported as [`SyncOutcome::Failed`].
    #[instrument(skip(self, order), fields(order_id = order.id))]
    pub async fn run(&self, order: &Order, skip_validation: bool) -> Result<SyncOutcome> {
        self.audit.log_info(&format!("Starting sync for order #{}", order.number), None, Some(order.id)).await;

        if skip_validation {
            info!("validation skipped by operator");
        } else {
            let report = match self.validator.validate(order).await {
                Ok(report) => report,
                Err(err) => {
                    let message = format!("Validation failed: {}", err.user_message());
                    return self.fail(order, &message, err.is_transient()).await;
                }
            };
            if !report.valid {
                return self.park_for_review(order, report).await;
            }
            self.log_warnings(order, &report).await;
        }

        let customer = match self.resolver.find_or_create(order).await {
            Ok(customer) => customer,
            Err(err) => return self.fail(order, &err.user_message(), err.is_transient()).await,
        };

        let tax_code = self.tax.resolve(order);
        if tax_code.is_none() {
            let rate = TaxCodeResolver::effective_rate(order);
            self.audit
                .log_info(
                    &format!("No tax code matched rate {:.4}; Evosus customer default applies", rate),
                    None,
                    Some(order.id),
                )
                .await;
        }

        let submission = match self.submitter.submit(order, &customer, tax_code).await {
            Ok(submission) => submission,
            Err(err) => return self.fail(order, &err.user_message(), err.is_transient()).await,
        };

        let mut record = self.store.get_sync_record(order.id).await?;
        record.mark_synced(submission.evosus_order_id.clone(), self.clock.now_unix());
        self.store.save_sync_record(order.id, &record).await?;
        self.store
            .add_order_note(
                order.id,
                &format!(
                    "Order synced to Evosus. Evosus Order ID: {} (PO Number: {})",
                    submission.evosus_order_id, submission.order_number
                ),
            )
            .await?;

        info!(evosus_order_id = %submission.evosus_order_id, customer_created = customer.is_new, "order synced");
        self.audit
            .log_sync(order.id, true, "Order synced successfully", Some(&submission.evosus_order_id))
            .await;
        self.notifiers
            .notify(&SyncEvent::SyncSucceeded {
                order_id: order.id,
                order_number: order.number.clone(),
                evosus_order_id: submission.evosus_order_id.clone(),
            })
            .await;

        Ok(SyncOutcome::Synced {
            evosus_order_id: submission.evosus_order_id,
            customer_id: customer.customer_id,
            customer_created: customer.is_new,
        })
    }

    async fn park_for_review(&self, order: &Order, report: ValidationReport) -> Result<SyncOutcome> {
        let issues = report.issues;
        warn!(issues = issues.len(), "order needs review");

        let mut record = self.store.get_sync_record(order.id).await?;
        record.mark_for_review(issues.clone(), self.clock.now_unix());
        self.store.save_sync_record(order.id, &record).await?;
        self.store.add_order_note(order.id, REVIEW_NOTE).await?;

        self.audit
            .log_warning(
                &format!("Order #{} flagged for review", order.number),
                Some(&json!({ "issues": issues })),
                Some(order.id),
            )
            .await;
        self.notifiers
            .notify(&SyncEvent::NeedsReview {
                order_id: order.id,
                order_number: order.number.clone(),
                issues: issues.clone(),
            })
            .await;

        Ok(SyncOutcome::NeedsReview { issues })
    }

    async fn log_warnings(&self, order: &Order, report: &ValidationReport) {
        for issue in report.warnings() {
            self.audit.log_warning(&issue.message, None, Some(order.id)).await;
        }
    }

    async fn fail(&self, order: &Order, message: &str, retryable: bool) -> Result<SyncOutcome> {
        warn!(error = %message, retryable, "order sync failed");
        self.audit.log_sync(order.id, false, message, None).await;
        self.store.add_order_note(order.id, &format!("Failed to sync to Evosus: {message}")).await?;
        self.notifiers
            .notify(&SyncEvent::SyncFailed {
                order_id: order.id,
                order_number: order.number.clone(),
                message: message.to_string(),
            })
            .await;
        Ok(SyncOutcome::Failed { message: message.to_string(), retryable })
    }
}
