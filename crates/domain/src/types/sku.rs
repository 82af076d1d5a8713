//! Storefront SKU → Evosus item code overrides

use serde::{Deserialize, Serialize};

/// Persisted mapping; `wc_sku` is unique and matched case-sensitively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuMapping {
    pub id: i64,
    pub wc_sku: String,
    pub evosus_sku: String,
    pub product_id: Option<i64>,
    /// Unix seconds.
    pub created_at: i64,
}

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImportReport {
    pub imported: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}
