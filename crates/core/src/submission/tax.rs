//! Effective-rate → Evosus tax code lookup

use evosync_domain::{Order, SyncConfig, TaxRateMapping};
use tracing::debug;

/// Matches an order's effective tax rate against the configured table
#[derive(Debug, Clone)]
pub struct TaxCodeResolver {
    rates: Vec<TaxRateMapping>,
    tolerance: f64,
}

impl TaxCodeResolver {
    pub fn new(rates: Vec<TaxRateMapping>, tolerance: f64) -> Self {
        Self { rates, tolerance: tolerance.abs() }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(config.tax_rates.clone(), config.tax_tolerance)
    }

    /// `total_tax / subtotal`, zero for an empty subtotal.
    pub fn effective_rate(order: &Order) -> f64 {
        if order.subtotal.abs() < f64::EPSILON {
            return 0.0;
        }
        order.total_tax / order.subtotal
    }

    /// First table entry within tolerance of `rate`, in declaration order.
    pub fn match_rate(&self, rate: f64) -> Option<&str> {
        self.rates
            .iter()
            .find(|mapping| (mapping.rate - rate).abs() <= self.tolerance)
            .map(|mapping| mapping.code.as_str())
    }

    /// Tax code for `order`; `None` lets Evosus apply the customer default.
    pub fn resolve(&self, order: &Order) -> Option<String> {
        let rate = Self::effective_rate(order);
        let code = self.match_rate(rate).map(str::to_string);
        debug!(order_id = order.id, rate, code = ?code, "tax code resolved");
        code
    }
}
