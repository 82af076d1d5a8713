//! Inbound Evosus webhook events

use serde::{Deserialize, Serialize};

/// Recognised webhook payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WebhookEvent {
    OrderUpdated { evosus_order_id: String, payload: serde_json::Value },
    OrderStatusChanged { evosus_order_id: String, new_status: String },
    InventoryUpdated { item_code: String, quantity_available: i64 },
    CustomerUpdated,
}

impl WebhookEvent {
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::OrderUpdated { .. } => "order.updated",
            Self::OrderStatusChanged { .. } => "order.status_changed",
            Self::InventoryUpdated { .. } => "inventory.updated",
            Self::CustomerUpdated => "customer.updated",
        }
    }
}

/// Body returned to the webhook caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

impl WebhookResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}
