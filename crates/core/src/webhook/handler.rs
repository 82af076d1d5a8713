//! Webhook effects
//!
//! Evosus pushes order, inventory and customer changes back to the
//! storefront. Malformed payloads are `InvalidInput` errors; events that
//! parse but cannot be applied (unknown order, unmappable status) come
//! back as an unsuccessful [`WebhookResponse`].

use std::sync::Arc;

use evosync_common::redacted_json;
use evosync_domain::{EvosyncError, OrderStatus, Result, WebhookEvent, WebhookResponse};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::audit::AuditLogger;
use crate::orders::ports::OrderStore;
use crate::sku::SkuMapper;
use crate::sync::AutoSyncTrigger;

/// Decode a webhook body into a typed event.
///
/// # Errors
/// [`EvosyncError::InvalidInput`] for unknown event types and missing fields.
pub fn parse_event(payload: &Value) -> Result<WebhookEvent> {
    let event_type = payload.get("event_type").and_then(Value::as_str).unwrap_or("unknown");
    match event_type {
        "order.updated" => {
            let evosus_order_id = scalar_string(payload.get("evosus_order_id"))
                .ok_or_else(|| EvosyncError::InvalidInput("Missing evosus_order_id".into()))?;
            Ok(WebhookEvent::OrderUpdated { evosus_order_id, payload: payload.clone() })
        }
        "order.status_changed" => {
            match (scalar_string(payload.get("evosus_order_id")), scalar_string(payload.get("new_status"))) {
                (Some(evosus_order_id), Some(new_status)) => {
                    Ok(WebhookEvent::OrderStatusChanged { evosus_order_id, new_status })
                }
                _ => Err(EvosyncError::InvalidInput("Missing required fields".into())),
            }
        }
        "inventory.updated" => {
            match (scalar_string(payload.get("item_code")), integer(payload.get("quantity_available"))) {
                (Some(item_code), Some(quantity_available)) => {
                    Ok(WebhookEvent::InventoryUpdated { item_code, quantity_available })
                }
                _ => Err(EvosyncError::InvalidInput("Missing required fields".into())),
            }
        }
        "customer.updated" => Ok(WebhookEvent::CustomerUpdated),
        other => {
            warn!(event_type = other, "unknown webhook event type");
            Err(EvosyncError::InvalidInput("Unknown event type".into()))
        }
    }
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer value, truncating floats and parsing numeric strings.
#[allow(clippy::cast_possible_truncation)]
fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

pub struct WebhookHandler {
    store: Arc<dyn OrderStore>,
    mapper: Arc<SkuMapper>,
    audit: Arc<AuditLogger>,
    auto_sync: Option<Arc<AutoSyncTrigger>>,
}

impl WebhookHandler {
    pub fn new(store: Arc<dyn OrderStore>, mapper: Arc<SkuMapper>, audit: Arc<AuditLogger>) -> Self {
        Self { store, mapper, audit, auto_sync: None }
    }

    /// Status changes applied by the webhook also fire the auto-sync trigger.
    #[must_use]
    pub fn with_auto_sync(mut self, trigger: Arc<AutoSyncTrigger>) -> Self {
        self.auto_sync = Some(trigger);
        self
    }

    /// Parse and apply one webhook body.
    ///
    /// # Errors
    /// `InvalidInput` for malformed payloads; storage faults otherwise.
    #[instrument(skip_all)]
    pub async fn handle(&self, payload: &Value) -> Result<WebhookResponse> {
        if payload.as_object().map_or(true, serde_json::Map::is_empty) {
            self.audit.log_error("Empty webhook data received", None, None).await;
            return Err(EvosyncError::InvalidInput("Empty webhook data".into()));
        }
        self.audit.log_info("Webhook received", Some(payload), None).await;

        let event = match parse_event(payload) {
            Ok(event) => event,
            Err(err) => {
                self.audit.log_warning(&err.user_message(), Some(payload), None).await;
                return Err(err);
            }
        };
        info!(event_type = event.event_type(), "webhook event");

        match event {
            WebhookEvent::OrderUpdated { evosus_order_id, payload } => {
                self.order_updated(&evosus_order_id, &payload).await
            }
            WebhookEvent::OrderStatusChanged { evosus_order_id, new_status } => {
                self.status_changed(&evosus_order_id, &new_status).await
            }
            WebhookEvent::InventoryUpdated { item_code, quantity_available } => {
                self.inventory_updated(&item_code, quantity_available).await
            }
            WebhookEvent::CustomerUpdated => {
                self.audit.log_info("Customer update webhook received", None, None).await;
                Ok(WebhookResponse::ok("Customer update acknowledged"))
            }
        }
    }

    async fn order_updated(&self, evosus_order_id: &str, payload: &Value) -> Result<WebhookResponse> {
        let Some(order_id) = self.store.find_by_evosus_order_id(evosus_order_id).await? else {
            return Ok(WebhookResponse::failed(format!("Order not found for Evosus ID: {evosus_order_id}")));
        };
        self.store
            .add_order_note(order_id, &format!("Evosus webhook: Order updated. Data: {}", redacted_json(payload)))
            .await?;
        self.audit.log_info(&format!("Order #{order_id} updated via webhook"), None, Some(order_id)).await;
        Ok(WebhookResponse::ok("Order updated successfully"))
    }

    async fn status_changed(&self, evosus_order_id: &str, new_status: &str) -> Result<WebhookResponse> {
        let Some(order_id) = self.store.find_by_evosus_order_id(evosus_order_id).await? else {
            return Ok(WebhookResponse::failed(format!("Order not found for Evosus ID: {evosus_order_id}")));
        };
        let Some(status) = OrderStatus::from_evosus(new_status) else {
            return Ok(WebhookResponse::failed("Could not map Evosus status to WooCommerce status"));
        };

        self.store.update_status(order_id, status.as_str()).await?;
        self.store
            .add_order_note(order_id, &format!("Status updated via Evosus webhook: {new_status}"))
            .await?;
        self.audit
            .log_info(&format!("Order #{order_id} status changed to {status} via webhook"), None, Some(order_id))
            .await;

        if let Some(trigger) = &self.auto_sync {
            trigger.on_status_changed(order_id, status.as_str()).await?;
        }
        Ok(WebhookResponse::ok("Order status updated successfully"))
    }

    async fn inventory_updated(&self, item_code: &str, quantity: i64) -> Result<WebhookResponse> {
        let Some(product_id) = self.product_for_item(item_code).await? else {
            return Ok(WebhookResponse::failed(format!("Product not found for SKU: {item_code}")));
        };
        self.store.set_product_stock(product_id, quantity).await?;
        self.audit
            .log_info(&format!("Product #{product_id} stock updated to {quantity} via webhook"), None, None)
            .await;
        Ok(WebhookResponse::ok("Inventory updated successfully"))
    }

    /// Direct SKU match first, then the mapping table (by Evosus code, then
    /// by storefront SKU).
    async fn product_for_item(&self, item_code: &str) -> Result<Option<i64>> {
        if let Some(product_id) = self.store.find_product_by_sku(item_code).await? {
            return Ok(Some(product_id));
        }

        let mapping = match self.mapper.get_mapping_by_evosus_sku(item_code).await? {
            Some(mapping) => Some(mapping),
            None => self.mapper.get_mapping(item_code).await?,
        };
        let Some(mapping) = mapping else {
            return Ok(None);
        };
        match mapping.product_id {
            Some(product_id) => Ok(Some(product_id)),
            None => self.store.find_product_by_sku(&mapping.wc_sku).await,
        }
    }
}
