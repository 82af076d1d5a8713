//! Order submitter

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use evosync_common::Clock;
use evosync_domain::constants::FALLBACK_ITEM_CODE_PREFIX;
use evosync_domain::{
    CustomerResolution, LineItem, NewOrder, Order, OrderLine, Result, SubmissionResult,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::audit::AuditLogger;
use crate::erp::ports::ErpClient;
use crate::sku::SkuMapper;

/// Synthetic item code for a line with neither SKU nor override.
pub fn fallback_item_code(item: &LineItem) -> String {
    format!("{FALLBACK_ITEM_CODE_PREFIX}{}", item.product_id.unwrap_or(item.id))
}

pub struct OrderSubmitter {
    erp: Arc<dyn ErpClient>,
    mapper: Arc<SkuMapper>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
    distribution_method_id: String,
}

impl OrderSubmitter {
    pub fn new(
        erp: Arc<dyn ErpClient>,
        mapper: Arc<SkuMapper>,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
        distribution_method_id: impl Into<String>,
    ) -> Self {
        Self { erp, mapper, audit, clock, distribution_method_id: distribution_method_id.into() }
    }

    /// Build the Evosus order for `order` and submit it.
    ///
    /// The storefront order number travels as `PONumber`.
    ///
    /// # Errors
    /// Remote rejections and exhausted transport retries.
    #[instrument(skip_all, fields(order_id = order.id, customer_id = %customer.customer_id))]
    pub async fn submit(
        &self,
        order: &Order,
        customer: &CustomerResolution,
        tax_code: Option<String>,
    ) -> Result<SubmissionResult> {
        let payload = self.build(order, customer, tax_code).await?;
        let evosus_order_id = self.erp.add_order(&payload).await?;

        info!(evosus_order_id = %evosus_order_id, po_number = %payload.po_number, "order created in Evosus");
        self.audit
            .log_info(
                &format!("Order created in Evosus: {evosus_order_id}"),
                Some(&json!({ "po_number": payload.po_number, "lines": payload.line_items.len() })),
                Some(order.id),
            )
            .await;

        Ok(SubmissionResult {
            evosus_order_id,
            order_number: order.number.clone(),
            message: "Order successfully synced to Evosus".to_string(),
        })
    }

    /// `Customer_Order_Add` payload for `order`.
    ///
    /// # Errors
    /// Mapping store failures.
    pub async fn build(
        &self,
        order: &Order,
        customer: &CustomerResolution,
        tax_code: Option<String>,
    ) -> Result<NewOrder> {
        let mut line_items = Vec::with_capacity(order.items.len());
        for item in order.product_items() {
            line_items.push(OrderLine {
                item_code: self.item_code(item).await?,
                quantity: item.quantity,
                unit_price: item.unit_price(),
                comment: item.name.clone(),
            });
        }

        let created = Utc
            .timestamp_opt(self.clock.now_unix(), 0)
            .single()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();

        Ok(NewOrder {
            customer_id: customer.customer_id.clone(),
            bill_to_location_id: customer.bill_to_location_id.clone(),
            ship_to_location_id: customer.ship_to_location_id.clone(),
            distribution_method_id: self.distribution_method_id.clone(),
            expected_order_total: format!("{:.2}", order.total),
            po_number: order.number.clone(),
            order_note: format!("Order from WooCommerce #{}", order.number),
            internal_note: format!("WooCommerce Order ID: {} | Created via API on {created}", order.id),
            line_items,
            sales_tax_pk: tax_code,
        })
    }

    /// Override, then mapped SKU (passthrough when unmapped), then fallback.
    async fn item_code(&self, item: &LineItem) -> Result<String> {
        if let Some(code) = item.sku_override.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(code.to_string());
        }
        let sku = item.sku.trim();
        if sku.is_empty() {
            return Ok(fallback_item_code(item));
        }
        self.mapper.get_evosus_sku(sku).await
    }
}
