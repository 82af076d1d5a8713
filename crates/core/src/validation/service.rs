//! Order validator
//!
//! Checks each product line against Evosus inventory. Blocking problems
//! (no SKU, unknown SKU) are `error` issues; discontinued items and short
//! stock are `warning` issues and never block a sync.

use std::sync::Arc;

use evosync_domain::constants::MAX_SKU_SUGGESTIONS;
use evosync_domain::{Issue, LineItem, Order, Result, SkuSuggestion, ValidationReport};
use tracing::{debug, instrument, warn};

use super::suggestions::sku_variants;
use crate::erp::ports::ErpClient;
use crate::sku::SkuMapper;

pub struct OrderValidator {
    erp: Arc<dyn ErpClient>,
    mapper: Arc<SkuMapper>,
}

impl OrderValidator {
    pub fn new(erp: Arc<dyn ErpClient>, mapper: Arc<SkuMapper>) -> Self {
        Self { erp, mapper }
    }

    /// Validate every product line of `order`.
    ///
    /// # Errors
    /// Fails only when Evosus or the mapping store cannot be reached; lookup
    /// misses are reported as issues.
    #[instrument(skip(self, order), fields(order_id = order.id))]
    pub async fn validate(&self, order: &Order) -> Result<ValidationReport> {
        let mut issues = Vec::new();
        for item in order.product_items() {
            self.check_item(item, &mut issues).await?;
        }
        let report = ValidationReport::from_issues(issues);
        debug!(valid = report.valid, issues = report.issues.len(), "order validated");
        Ok(report)
    }

    async fn check_item(&self, item: &LineItem, issues: &mut Vec<Issue>) -> Result<()> {
        let item_code = match item.sku_override.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => {
                let sku = item.sku.trim();
                if sku.is_empty() {
                    issues.push(Issue::missing_sku(item.id, &item.name));
                    return Ok(());
                }
                self.mapper.get_evosus_sku(sku).await?
            }
        };

        let Some(inventory) = self.erp.get_inventory_item(&item_code).await? else {
            let suggestions = self.suggest(&item_code).await;
            issues.push(Issue::sku_not_found(item.id, &item.name, &item_code, suggestions));
            return Ok(());
        };

        if inventory.discontinued {
            issues.push(Issue::discontinued(item.id, &item.name, &item_code));
        }
        if inventory.quantity_available < item.quantity as f64 {
            issues.push(Issue::insufficient_stock(
                item.id,
                &item.name,
                &item_code,
                inventory.quantity_available,
                item.quantity,
            ));
        }
        Ok(())
    }

    /// Look up to three variants of `sku`, returning those that exist.
    async fn suggest(&self, sku: &str) -> Vec<SkuSuggestion> {
        let mut suggestions = Vec::new();
        for variant in sku_variants(sku).into_iter().take(MAX_SKU_SUGGESTIONS) {
            match self.erp.get_inventory_item(&variant).await {
                Ok(Some(found)) => {
                    suggestions.push(SkuSuggestion { sku: variant, description: found.description });
                }
                Ok(None) => {}
                Err(err) => warn!(variant = %variant, error = %err, "sku suggestion lookup failed"),
            }
            if suggestions.len() >= MAX_SKU_SUGGESTIONS {
                break;
            }
        }
        suggestions
    }
}
