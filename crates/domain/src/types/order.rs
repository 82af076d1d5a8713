//! Storefront order snapshot
//!
//! Orders are owned by WooCommerce. The sync engine reads them as immutable
//! snapshots; the only writes it performs go through the order store port
//! (sync metadata, notes, status, per-item SKU overrides).

use serde::{Deserialize, Serialize};

/// Billing or shipping address as captured on the order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2 code.
    pub country: String,
    pub email: String,
    pub phone: String,
}

impl Address {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    /// Street line present (used to decide whether a shipping block exists).
    pub fn has_street(&self) -> bool {
        !self.address_1.trim().is_empty()
    }
}

/// A single order line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    /// `None` when the product has since been deleted from the store.
    pub product_id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub sku: String,
    pub quantity: i64,
    /// Line total after discounts, excluding tax.
    pub line_total: f64,
    /// Manual item code set by an operator during review.
    #[serde(default)]
    pub sku_override: Option<String>,
}

impl LineItem {
    /// Price actually paid per unit, rounded to cents.
    pub fn unit_price(&self) -> f64 {
        if self.quantity <= 0 {
            return 0.0;
        }
        round_cents(self.line_total / self.quantity as f64)
    }
}

/// Order snapshot at sync time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Customer-facing order number; becomes the Evosus PO number.
    pub number: String,
    pub status: String,
    #[serde(default)]
    pub customer_id: i64,
    pub billing: Address,
    #[serde(default)]
    pub shipping: Address,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub total_tax: f64,
    pub total: f64,
    /// Unix seconds.
    #[serde(default)]
    pub created_at: i64,
}

impl Order {
    /// Shipping block if it carries a street line, otherwise billing.
    pub fn effective_shipping(&self) -> &Address {
        if self.shipping.has_street() {
            &self.shipping
        } else {
            &self.billing
        }
    }

    /// Lines still backed by a product.
    pub fn product_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| item.product_id.is_some())
    }
}

/// Storefront order statuses the engine reasons about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
}

crate::impl_domain_status_conversions!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    OnHold => "on-hold",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Statuses that trigger an automatic sync.
    pub const fn triggers_auto_sync(self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }

    /// Map an Evosus order status onto the storefront vocabulary.
    ///
    /// Returns `None` for statuses with no storefront equivalent.
    pub fn from_evosus(status: &str) -> Option<Self> {
        match status.trim().to_lowercase().as_str() {
            "open" => Some(Self::Processing),
            "closed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "on-hold" => Some(Self::OnHold),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// Round half away from zero to two decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, line_total: f64) -> LineItem {
        LineItem { id: 1, product_id: Some(9), quantity, line_total, ..LineItem::default() }
    }

    #[test]
    fn unit_price_uses_discounted_total() {
        assert_eq!(line(3, 50.0).unit_price(), 16.67);
        assert_eq!(line(2, 19.98).unit_price(), 9.99);
        assert_eq!(line(0, 10.0).unit_price(), 0.0);
    }

    #[test]
    fn shipping_falls_back_to_billing_without_street() {
        let mut order = Order {
            billing: Address { address_1: "1 Bill St".into(), ..Address::default() },
            ..Order::default()
        };
        assert_eq!(order.effective_shipping().address_1, "1 Bill St");

        order.shipping.address_1 = "2 Ship Rd".into();
        assert_eq!(order.effective_shipping().address_1, "2 Ship Rd");
    }

    #[test]
    fn evosus_status_mapping() {
        assert_eq!(OrderStatus::from_evosus("Open"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::from_evosus("CLOSED"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::from_evosus("cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(OrderStatus::from_evosus("on-hold"), Some(OrderStatus::OnHold));
        assert_eq!(OrderStatus::from_evosus("pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::from_evosus("invoiced"), None);
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let address = Address { first_name: "Ada".into(), ..Address::default() };
        assert_eq!(address.full_name(), "Ada");
    }
}
