//! SQLite-backed storefront order store.
//!
//! Holds a local mirror of storefront orders (imported from JSON exports)
//! together with the sync metadata the engine writes back.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_common::Clock;
use evosync_core::OrderStore;
use evosync_domain::{Address, EvosyncError, LineItem, Order, Result, SyncRecord};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::manager::{map_sql_error, with_connection, DbManager};

/// Catalogue product as exported by the storefront
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

/// Storefront export accepted by [`SqliteOrderStore::import`]
///
/// Either a bare array of orders or an object with `orders` and `products`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StorefrontExport {
    Orders(Vec<Order>),
    Full {
        #[serde(default)]
        orders: Vec<Order>,
        #[serde(default)]
        products: Vec<ProductRecord>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub orders: usize,
    pub items: usize,
    pub products: usize,
}

pub struct SqliteOrderStore {
    db: Arc<DbManager>,
    clock: Arc<dyn Clock>,
}

impl SqliteOrderStore {
    pub fn new(db: Arc<DbManager>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Parse a storefront JSON export and upsert it.
    pub async fn import_json(&self, json: &str) -> Result<ImportSummary> {
        let export: StorefrontExport = serde_json::from_str(json)
            .map_err(|err| EvosyncError::InvalidInput(format!("invalid order export: {err}")))?;
        self.import(export).await
    }

    /// Upsert orders and products. Existing sync metadata and SKU overrides
    /// survive a re-import.
    pub async fn import(&self, export: StorefrontExport) -> Result<ImportSummary> {
        let (orders, products) = match export {
            StorefrontExport::Orders(orders) => (orders, Vec::new()),
            StorefrontExport::Full { orders, products } => (orders, products),
        };
        let summary = with_connection(&self.db, move |conn| import_all(conn, &orders, &products)).await?;
        info!(orders = summary.orders, items = summary.items, products = summary.products, "storefront export imported");
        Ok(summary)
    }

    fn load_order(conn: &Connection, order_id: i64) -> Result<Option<Order>> {
        let Some(mut order) = conn
            .query_row(&format!("{ORDER_SELECT_SQL} WHERE id = ?1"), params![order_id], map_order_row)
            .optional()
            .map_err(map_sql_error)?
        else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(ITEM_SELECT_SQL).map_err(map_sql_error)?;
        let items = stmt.query_map(params![order_id], map_item_row).map_err(map_sql_error)?;
        order.items = items.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)?;
        Ok(Some(order))
    }

    fn load_record(conn: &Connection, order_id: i64) -> Result<SyncRecord> {
        conn.query_row(
            "SELECT synced, evosus_order_id, sync_date, needs_review, review_issues, review_date
             FROM order_meta WHERE order_id = ?1",
            params![order_id],
            map_record_row,
        )
        .optional()
        .map(Option::unwrap_or_default)
        .map_err(map_sql_error)
    }

    fn load_pairs(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<(Order, SyncRecord)>> {
        let ids = query_ids(conn, sql, params)?;
        let mut pairs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(order) = Self::load_order(conn, id)? {
                pairs.push((order, Self::load_record(conn, id)?));
            }
        }
        Ok(pairs)
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
        with_connection(&self.db, move |conn| Self::load_order(conn, order_id)).await
    }

    async fn get_sync_record(&self, order_id: i64) -> Result<SyncRecord> {
        with_connection(&self.db, move |conn| Self::load_record(conn, order_id)).await
    }

    async fn save_sync_record(&self, order_id: i64, record: &SyncRecord) -> Result<()> {
        let record = record.clone();
        with_connection(&self.db, move |conn| {
            let issues = serde_json::to_string(&record.review_issues)
                .map_err(|err| EvosyncError::Internal(format!("cannot encode review issues: {err}")))?;
            conn.execute(
                "INSERT INTO order_meta
                    (order_id, synced, evosus_order_id, sync_date, needs_review, review_issues, review_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(order_id) DO UPDATE SET
                    synced = excluded.synced,
                    evosus_order_id = excluded.evosus_order_id,
                    sync_date = excluded.sync_date,
                    needs_review = excluded.needs_review,
                    review_issues = excluded.review_issues,
                    review_date = excluded.review_date",
                params![
                    order_id,
                    record.synced,
                    record.evosus_order_id,
                    record.sync_date,
                    record.needs_review,
                    issues,
                    record.review_date,
                ],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn add_order_note(&self, order_id: i64, note: &str) -> Result<()> {
        let note = note.to_string();
        let now = self.clock.now_unix();
        with_connection(&self.db, move |conn| {
            conn.execute(
                "INSERT INTO order_notes (order_id, note, created_at) VALUES (?1, ?2, ?3)",
                params![order_id, note, now],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn set_item_sku_override(&self, order_id: i64, item_id: i64, sku: Option<&str>) -> Result<bool> {
        let sku = sku.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        with_connection(&self.db, move |conn| {
            let updated = conn
                .execute(
                    "UPDATE order_items SET sku_override = ?3 WHERE order_id = ?1 AND id = ?2",
                    params![order_id, item_id, sku],
                )
                .map_err(map_sql_error)?;
            Ok(updated > 0)
        })
        .await
    }

    async fn list_order_ids(&self, status: Option<&str>, limit: u32, unsynced_only: bool) -> Result<Vec<i64>> {
        let status = status.map(str::to_string);
        with_connection(&self.db, move |conn| {
            query_ids(
                conn,
                "SELECT o.id FROM orders o
                 LEFT JOIN order_meta m ON m.order_id = o.id
                 WHERE (?1 IS NULL OR o.status = ?1)
                   AND (?2 = 0 OR COALESCE(m.synced, 0) = 0)
                 ORDER BY o.created_at DESC, o.id DESC
                 LIMIT ?3",
                params![status, unsynced_only, limit],
            )
        })
        .await
    }

    async fn list_needing_review(&self) -> Result<Vec<(Order, SyncRecord)>> {
        with_connection(&self.db, |conn| {
            Self::load_pairs(
                conn,
                "SELECT order_id FROM order_meta WHERE needs_review = 1
                 ORDER BY review_date DESC, order_id DESC",
                (),
            )
        })
        .await
    }

    async fn list_synced_since(&self, since: i64) -> Result<Vec<(Order, SyncRecord)>> {
        with_connection(&self.db, move |conn| {
            Self::load_pairs(
                conn,
                "SELECT order_id FROM order_meta WHERE synced = 1 AND sync_date >= ?1
                 ORDER BY sync_date DESC, order_id DESC",
                params![since],
            )
        })
        .await
    }

    async fn find_by_evosus_order_id(&self, evosus_order_id: &str) -> Result<Option<i64>> {
        let evosus_order_id = evosus_order_id.trim().to_string();
        with_connection(&self.db, move |conn| {
            conn.query_row(
                "SELECT order_id FROM order_meta WHERE evosus_order_id = ?1 ORDER BY order_id LIMIT 1",
                params![evosus_order_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn update_status(&self, order_id: i64, status: &str) -> Result<()> {
        let status = status.to_string();
        with_connection(&self.db, move |conn| {
            let updated = conn
                .execute("UPDATE orders SET status = ?2 WHERE id = ?1", params![order_id, status])
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(EvosyncError::NotFound(format!("order {order_id}")));
            }
            Ok(())
        })
        .await
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<i64>> {
        let sku = sku.trim().to_string();
        if sku.is_empty() {
            return Ok(None);
        }
        with_connection(&self.db, move |conn| {
            conn.query_row("SELECT id FROM products WHERE sku = ?1 ORDER BY id LIMIT 1", params![sku], |row| {
                row.get(0)
            })
            .optional()
            .map_err(map_sql_error)
        })
        .await
    }

    async fn set_product_stock(&self, product_id: i64, quantity: i64) -> Result<()> {
        with_connection(&self.db, move |conn| {
            let updated = conn
                .execute(
                    "UPDATE products SET stock_quantity = ?2 WHERE id = ?1",
                    params![product_id, quantity],
                )
                .map_err(map_sql_error)?;
            if updated == 0 {
                return Err(EvosyncError::NotFound(format!("product {product_id}")));
            }
            Ok(())
        })
        .await
    }
}

fn import_all(conn: &Connection, orders: &[Order], products: &[ProductRecord]) -> Result<ImportSummary> {
    let tx = conn.unchecked_transaction().map_err(map_sql_error)?;
    let mut summary = ImportSummary::default();

    for product in products {
        tx.execute(
            "INSERT INTO products (id, sku, name, stock_quantity) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                sku = excluded.sku,
                name = excluded.name,
                stock_quantity = COALESCE(excluded.stock_quantity, products.stock_quantity)",
            params![product.id, product.sku.trim(), product.name, product.stock_quantity],
        )
        .map_err(map_sql_error)?;
        summary.products += 1;
    }

    for order in orders {
        let billing = encode_address(&order.billing)?;
        let shipping = encode_address(&order.shipping)?;
        tx.execute(
            "INSERT INTO orders
                (id, number, status, customer_id, billing, shipping, subtotal, total_tax, total, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                number = excluded.number,
                status = excluded.status,
                customer_id = excluded.customer_id,
                billing = excluded.billing,
                shipping = excluded.shipping,
                subtotal = excluded.subtotal,
                total_tax = excluded.total_tax,
                total = excluded.total,
                created_at = excluded.created_at",
            params![
                order.id,
                order.number,
                order.status,
                order.customer_id,
                billing,
                shipping,
                order.subtotal,
                order.total_tax,
                order.total,
                order.created_at,
            ],
        )
        .map_err(map_sql_error)?;

        for item in &order.items {
            tx.execute(
                "INSERT INTO order_items (id, order_id, product_id, name, sku, quantity, line_total, sku_override)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    order_id = excluded.order_id,
                    product_id = excluded.product_id,
                    name = excluded.name,
                    sku = excluded.sku,
                    quantity = excluded.quantity,
                    line_total = excluded.line_total,
                    sku_override = COALESCE(excluded.sku_override, order_items.sku_override)",
                params![
                    item.id,
                    order.id,
                    item.product_id,
                    item.name,
                    item.sku,
                    item.quantity,
                    item.line_total,
                    item.sku_override,
                ],
            )
            .map_err(map_sql_error)?;

            if let Some(product_id) = item.product_id {
                tx.execute(
                    "INSERT OR IGNORE INTO products (id, sku, name) VALUES (?1, ?2, ?3)",
                    params![product_id, item.sku.trim(), item.name],
                )
                .map_err(map_sql_error)?;
            }
            summary.items += 1;
        }
        summary.orders += 1;
    }

    tx.commit().map_err(map_sql_error)?;
    Ok(summary)
}

fn encode_address(address: &Address) -> Result<String> {
    serde_json::to_string(address)
        .map_err(|err| EvosyncError::Internal(format!("cannot encode address: {err}")))
}

fn decode_address(order_id: i64, raw: &str) -> Address {
    serde_json::from_str(raw).unwrap_or_else(|err| {
        warn!(order_id, error = %err, "unreadable stored address - using empty address");
        Address::default()
    })
}

fn query_ids(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, |row| row.get(0)).map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

const ORDER_SELECT_SQL: &str = "SELECT id, number, status, customer_id, billing, shipping,
        subtotal, total_tax, total, created_at
    FROM orders";

const ITEM_SELECT_SQL: &str = "SELECT id, product_id, name, sku, quantity, line_total, sku_override
    FROM order_items WHERE order_id = ?1 ORDER BY id";

fn map_order_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    let id: i64 = row.get(0)?;
    let billing: String = row.get(4)?;
    let shipping: String = row.get(5)?;
    Ok(Order {
        id,
        number: row.get(1)?,
        status: row.get(2)?,
        customer_id: row.get(3)?,
        billing: decode_address(id, &billing),
        shipping: decode_address(id, &shipping),
        items: Vec::new(),
        subtotal: row.get(6)?,
        total_tax: row.get(7)?,
        total: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn map_item_row(row: &Row<'_>) -> rusqlite::Result<LineItem> {
    Ok(LineItem {
        id: row.get(0)?,
        product_id: row.get(1)?,
        name: row.get(2)?,
        sku: row.get(3)?,
        quantity: row.get(4)?,
        line_total: row.get(5)?,
        sku_override: row.get(6)?,
    })
}

fn map_record_row(row: &Row<'_>) -> rusqlite::Result<SyncRecord> {
    let issues: String = row.get(4)?;
    Ok(SyncRecord {
        synced: row.get(0)?,
        evosus_order_id: row.get(1)?,
        sync_date: row.get(2)?,
        needs_review: row.get(3)?,
        review_issues: serde_json::from_str(&issues).unwrap_or_else(|err| {
            warn!(error = %err, "unreadable review issues - treating as none");
            Vec::new()
        }),
        review_date: row.get(5)?,
    })
}
