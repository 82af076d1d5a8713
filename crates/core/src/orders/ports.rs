//! Order store port
//!
//! The storefront owns orders. Everything the engine reads or writes about
//! them (snapshots, sync metadata, notes, overrides, stock) goes through
//! this trait.

use async_trait::async_trait;
use evosync_domain::{Order, Result, SyncRecord};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, order_id: i64) -> Result<Option<Order>>;

    /// Sync metadata; a default (unsynced) record when none was saved yet.
    async fn get_sync_record(&self, order_id: i64) -> Result<SyncRecord>;

    async fn save_sync_record(&self, order_id: i64, record: &SyncRecord) -> Result<()>;

    /// Append a private note to the order history.
    async fn add_order_note(&self, order_id: i64, note: &str) -> Result<()>;

    /// Set (or clear, with `None`) the manual item code for one line.
    ///
    /// Returns `false` when the order has no such line.
    async fn set_item_sku_override(
        &self,
        order_id: i64,
        item_id: i64,
        sku: Option<&str>,
    ) -> Result<bool>;

    /// Order ids, newest first, optionally filtered by status and
    /// restricted to orders that are not yet synced.
    async fn list_order_ids(
        &self,
        status: Option<&str>,
        limit: u32,
        unsynced_only: bool,
    ) -> Result<Vec<i64>>;

    async fn list_needing_review(&self) -> Result<Vec<(Order, SyncRecord)>>;

    /// Orders whose `sync_date` is at or after `since` (unix seconds).
    async fn list_synced_since(&self, since: i64) -> Result<Vec<(Order, SyncRecord)>>;

    async fn find_by_evosus_order_id(&self, evosus_order_id: &str) -> Result<Option<i64>>;

    async fn update_status(&self, order_id: i64, status: &str) -> Result<()>;

    /// Product id carrying `sku`.
    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<i64>>;

    async fn set_product_stock(&self, product_id: i64, quantity: i64) -> Result<()>;
}
