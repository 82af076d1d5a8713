//! SQLite implementation of the SKU mapping port.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_core::SkuMappingRepository;
use evosync_domain::{Result, SkuMapping};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::manager::{map_sql_error, with_connection, DbManager};

pub struct SqliteSkuMappingRepository {
    db: Arc<DbManager>,
}

impl SqliteSkuMappingRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn upsert_row(
        conn: &Connection,
        wc_sku: &str,
        evosus_sku: &str,
        product_id: Option<i64>,
        created_at: i64,
    ) -> Result<SkuMapping> {
        conn.execute(UPSERT_SQL, params![wc_sku, evosus_sku, product_id, created_at])
            .map_err(map_sql_error)?;
        conn.query_row(&format!("{SELECT_SQL} WHERE wc_sku = ?1"), params![wc_sku], map_mapping_row)
            .map_err(map_sql_error)
    }

    fn find_one(conn: &Connection, column: &str, value: &str) -> Result<Option<SkuMapping>> {
        conn.query_row(
            &format!("{SELECT_SQL} WHERE {column} = ?1 ORDER BY id LIMIT 1"),
            params![value],
            map_mapping_row,
        )
        .optional()
        .map_err(map_sql_error)
    }

    fn delete_ids(conn: &Connection, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let deleted = conn
            .execute(&format!("DELETE FROM sku_mappings WHERE id IN ({placeholders})"), params_from_iter(ids))
            .map_err(map_sql_error)?;
        Ok(deleted as u64)
    }

    fn query_many(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<SkuMapping>> {
        let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
        let rows = stmt.query_map(params, map_mapping_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }

    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        with_connection(&self.db, f).await
    }
}

#[async_trait]
impl SkuMappingRepository for SqliteSkuMappingRepository {
    async fn upsert(
        &self,
        wc_sku: &str,
        evosus_sku: &str,
        product_id: Option<i64>,
        created_at: i64,
    ) -> Result<SkuMapping> {
        let wc_sku = wc_sku.to_string();
        let evosus_sku = evosus_sku.to_string();
        self.run(move |conn| Self::upsert_row(conn, &wc_sku, &evosus_sku, product_id, created_at))
            .await
    }

    async fn find_by_wc_sku(&self, wc_sku: &str) -> Result<Option<SkuMapping>> {
        let wc_sku = wc_sku.to_string();
        self.run(move |conn| Self::find_one(conn, "wc_sku", &wc_sku)).await
    }

    async fn find_by_evosus_sku(&self, evosus_sku: &str) -> Result<Option<SkuMapping>> {
        let evosus_sku = evosus_sku.to_string();
        self.run(move |conn| Self::find_one(conn, "evosus_sku", &evosus_sku)).await
    }

    async fn find_by_product(&self, product_id: i64) -> Result<Vec<SkuMapping>> {
        self.run(move |conn| {
            Self::query_many(
                conn,
                &format!("{SELECT_SQL} WHERE product_id = ?1 ORDER BY wc_sku"),
                params![product_id],
            )
        })
        .await
    }

    async fn delete_by_wc_sku(&self, wc_sku: &str) -> Result<bool> {
        let wc_sku = wc_sku.to_string();
        self.run(move |conn| {
            let deleted = conn
                .execute("DELETE FROM sku_mappings WHERE wc_sku = ?1", params![wc_sku])
                .map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        let ids = ids.to_vec();
        self.run(move |conn| Self::delete_ids(conn, &ids)).await
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<SkuMapping>> {
        self.run(move |conn| {
            Self::query_many(
                conn,
                &format!("{SELECT_SQL} ORDER BY wc_sku LIMIT ?1 OFFSET ?2"),
                params![limit, offset],
            )
        })
        .await
    }

    async fn search(&self, term: &str, limit: u32) -> Result<Vec<SkuMapping>> {
        let pattern = format!("%{}%", escape_like(term));
        self.run(move |conn| {
            Self::query_many(
                conn,
                &format!(
                    "{SELECT_SQL} WHERE wc_sku LIKE ?1 ESCAPE '\\' OR evosus_sku LIKE ?1 ESCAPE '\\'
                     ORDER BY wc_sku LIMIT ?2"
                ),
                params![pattern, limit],
            )
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            conn.query_row("SELECT COUNT(*) FROM sku_mappings", [], |row| row.get::<_, i64>(0))
                .map(|count| count.max(0) as u64)
                .map_err(map_sql_error)
        })
        .await
    }
}

const SELECT_SQL: &str =
    "SELECT id, wc_sku, evosus_sku, product_id, created_at FROM sku_mappings";

const UPSERT_SQL: &str = "INSERT INTO sku_mappings (wc_sku, evosus_sku, product_id, created_at)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(wc_sku) DO UPDATE SET
        evosus_sku = excluded.evosus_sku,
        product_id = COALESCE(excluded.product_id, sku_mappings.product_id)";

fn map_mapping_row(row: &Row<'_>) -> rusqlite::Result<SkuMapping> {
    Ok(SkuMapping {
        id: row.get(0)?,
        wc_sku: row.get(1)?,
        evosus_sku: row.get(2)?,
        product_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn repository() -> (TempDir, SqliteSkuMappingRepository) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db = DbManager::new(temp_dir.path().join("sku.db"), 2).expect("manager created");
        db.run_migrations().expect("migrations run");
        (temp_dir, SqliteSkuMappingRepository::new(Arc::new(db)))
    }

    #[tokio::test]
    async fn upsert_replaces_existing_mapping() {
        let (_dir, repo) = repository();
        let first = repo.upsert("WC-1", "EV-1", Some(10), 100).await.unwrap();
        let second = repo.upsert("WC-1", "EV-2", None, 200).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.evosus_sku, "EV-2");
        assert_eq!(second.product_id, Some(10));
        assert_eq!(second.created_at, 100);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookups_are_exact_and_case_sensitive() {
        let (_dir, repo) = repository();
        repo.upsert("Pump-1", "EV-PUMP", Some(3), 1).await.unwrap();

        assert!(repo.find_by_wc_sku("Pump-1").await.unwrap().is_some());
        assert!(repo.find_by_wc_sku("PUMP-1").await.unwrap().is_none());
        assert_eq!(repo.find_by_evosus_sku("EV-PUMP").await.unwrap().unwrap().wc_sku, "Pump-1");
        assert_eq!(repo.find_by_product(3).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_wc_sku_with_paging() {
        let (_dir, repo) = repository();
        for sku in ["C", "A", "B"] {
            repo.upsert(sku, &format!("EV-{sku}"), None, 1).await.unwrap();
        }

        let page: Vec<_> = repo.list(2, 0).await.unwrap().into_iter().map(|m| m.wc_sku).collect();
        assert_eq!(page, ["A", "B"]);
        let rest: Vec<_> = repo.list(2, 2).await.unwrap().into_iter().map(|m| m.wc_sku).collect();
        assert_eq!(rest, ["C"]);
    }

    #[tokio::test]
    async fn search_matches_either_column_literally() {
        let (_dir, repo) = repository();
        repo.upsert("FILTER-10", "EV-900", None, 1).await.unwrap();
        repo.upsert("HOSE_2", "EV-HOSE", None, 1).await.unwrap();
        repo.upsert("HOSEX2", "EV-HOSE-X", None, 1).await.unwrap();

        assert_eq!(repo.search("900", 10).await.unwrap().len(), 1);
        assert_eq!(repo.search("HOSE", 10).await.unwrap().len(), 2);
        let literal = repo.search("E_2", 10).await.unwrap();
        assert_eq!(literal.len(), 1);
        assert_eq!(literal[0].wc_sku, "HOSE_2");
    }

    #[tokio::test]
    async fn deletes_by_sku_and_ids() {
        let (_dir, repo) = repository();
        let a = repo.upsert("A", "1", None, 1).await.unwrap();
        let b = repo.upsert("B", "2", None, 1).await.unwrap();
        repo.upsert("C", "3", None, 1).await.unwrap();

        assert!(repo.delete_by_wc_sku("C").await.unwrap());
        assert!(!repo.delete_by_wc_sku("C").await.unwrap());
        assert_eq!(repo.delete_by_ids(&[a.id, b.id, 999]).await.unwrap(), 2);
        assert_eq!(repo.delete_by_ids(&[]).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
