//! Port interface for SKU mapping storage
//!
//! Lookups by `wc_sku` are exact and case-sensitive, and must hit an index.

use async_trait::async_trait;
use evosync_domain::{Result, SkuMapping};

#[async_trait]
pub trait SkuMappingRepository: Send + Sync {
    /// Insert or replace the mapping for `wc_sku`.
    async fn upsert(
        &self,
        wc_sku: &str,
        evosus_sku: &str,
        product_id: Option<i64>,
        created_at: i64,
    ) -> Result<SkuMapping>;

    async fn find_by_wc_sku(&self, wc_sku: &str) -> Result<Option<SkuMapping>>;

    async fn find_by_evosus_sku(&self, evosus_sku: &str) -> Result<Option<SkuMapping>>;

    async fn find_by_product(&self, product_id: i64) -> Result<Vec<SkuMapping>>;

    /// Returns whether a row was removed.
    async fn delete_by_wc_sku(&self, wc_sku: &str) -> Result<bool>;

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64>;

    /// Ordered by `wc_sku`.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<SkuMapping>>;

    /// Substring match on either SKU column.
    async fn search(&self, term: &str, limit: u32) -> Result<Vec<SkuMapping>>;

    async fn count(&self) -> Result<u64>;
}
