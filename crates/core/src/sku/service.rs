//! SKU mapper service

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use evosync_common::Clock;
use evosync_domain::{CsvImportReport, EvosyncError, Result, SkuMapping};
use tracing::{info, instrument, warn};

use super::ports::SkuMappingRepository;

pub const CSV_EXPORT_HEADER: [&str; 4] =
    ["WooCommerce SKU", "Evosus SKU", "Product ID", "Created At"];

const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Reject import files that are not `.csv`.
pub fn ensure_csv_path(path: &Path) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        Ok(())
    } else {
        Err(EvosyncError::InvalidInput(format!(
            "Only .csv files can be imported: {}",
            path.display()
        )))
    }
}

/// Translates storefront SKUs to Evosus item codes
pub struct SkuMapper {
    repository: Arc<dyn SkuMappingRepository>,
    clock: Arc<dyn Clock>,
}

impl SkuMapper {
    pub fn new(repository: Arc<dyn SkuMappingRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Mapped item code, or `wc_sku` unchanged when no mapping exists.
    pub async fn get_evosus_sku(&self, wc_sku: &str) -> Result<String> {
        Ok(self
            .repository
            .find_by_wc_sku(wc_sku)
            .await?
            .map_or_else(|| wc_sku.to_string(), |mapping| mapping.evosus_sku))
    }

    pub async fn get_mapping(&self, wc_sku: &str) -> Result<Option<SkuMapping>> {
        self.repository.find_by_wc_sku(wc_sku).await
    }

    /// Mapping whose Evosus side is `evosus_sku`.
    pub async fn get_mapping_by_evosus_sku(&self, evosus_sku: &str) -> Result<Option<SkuMapping>> {
        self.repository.find_by_evosus_sku(evosus_sku).await
    }

    #[instrument(skip(self))]
    pub async fn add_mapping(
        &self,
        wc_sku: &str,
        evosus_sku: &str,
        product_id: Option<i64>,
    ) -> Result<SkuMapping> {
        let wc_sku = wc_sku.trim();
        let evosus_sku = evosus_sku.trim();
        if wc_sku.is_empty() || evosus_sku.is_empty() {
            return Err(EvosyncError::InvalidInput(
                "Both WooCommerce SKU and Evosus SKU are required".into(),
            ));
        }
        let mapping =
            self.repository.upsert(wc_sku, evosus_sku, product_id, self.clock.now_unix()).await?;
        info!(wc_sku, evosus_sku, "sku mapping saved");
        Ok(mapping)
    }

    pub async fn delete_mapping(&self, wc_sku: &str) -> Result<bool> {
        self.repository.delete_by_wc_sku(wc_sku).await
    }

    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.repository.delete_by_ids(ids).await
    }

    pub async fn get_all(&self, limit: u32, offset: u32) -> Result<Vec<SkuMapping>> {
        self.repository.list(limit, offset).await
    }

    pub async fn search(&self, term: &str, limit: Option<u32>) -> Result<Vec<SkuMapping>> {
        self.repository.search(term.trim(), limit.unwrap_or(DEFAULT_SEARCH_LIMIT)).await
    }

    pub async fn get_by_product(&self, product_id: i64) -> Result<Vec<SkuMapping>> {
        self.repository.find_by_product(product_id).await
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository.count().await
    }

    /// Import `wc_sku,evosus_sku[,product_id]` rows; the first row is a header.
    ///
    /// Rows are validated and saved one by one; a bad row is reported and
    /// skipped without aborting the import.
    pub async fn import_csv<R: Read + Send>(&self, reader: R) -> Result<CsvImportReport> {
        let rows = parse_import_rows(reader)?;
        let mut report = CsvImportReport::default();

        for row in rows {
            match row {
                ImportRow::Blank => report.skipped += 1,
                ImportRow::Invalid(message) => {
                    report.skipped += 1;
                    report.errors.push(message);
                }
                ImportRow::Mapping { line, wc_sku, evosus_sku, product_id } => {
                    match self.add_mapping(&wc_sku, &evosus_sku, product_id).await {
                        Ok(_) => report.imported += 1,
                        Err(err) => {
                            report.skipped += 1;
                            report.errors.push(format!("Line {line}: {err}"));
                        }
                    }
                }
            }
        }

        info!(imported = report.imported, skipped = report.skipped, "sku mapping csv import");
        Ok(report)
    }

    /// Write every mapping as CSV; returns the number of data rows.
    pub async fn export_csv<W: Write + Send>(&self, writer: W) -> Result<u64> {
        let total = self.repository.count().await?;
        let limit = u32::try_from(total).unwrap_or(u32::MAX);
        let mappings = self.repository.list(limit, 0).await?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(CSV_EXPORT_HEADER).map_err(csv_error)?;
        for mapping in &mappings {
            let product_id = mapping.product_id.map(|id| id.to_string()).unwrap_or_default();
            let created_at = chrono::DateTime::from_timestamp(mapping.created_at, 0)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            csv_writer
                .write_record([
                    mapping.wc_sku.as_str(),
                    mapping.evosus_sku.as_str(),
                    product_id.as_str(),
                    created_at.as_str(),
                ])
                .map_err(csv_error)?;
        }
        csv_writer.flush().map_err(|e| EvosyncError::Internal(format!("CSV write failed: {e}")))?;

        Ok(mappings.len() as u64)
    }
}

enum ImportRow {
    Blank,
    Invalid(String),
    Mapping { line: u64, wc_sku: String, evosus_sku: String, product_id: Option<i64> },
}

fn parse_import_rows<R: Read>(reader: R) -> Result<Vec<ImportRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, csv::Position::line);
        let wc_sku = record.get(0).unwrap_or_default();
        let evosus_sku = record.get(1).unwrap_or_default();

        if wc_sku.is_empty() && evosus_sku.is_empty() {
            rows.push(ImportRow::Blank);
            continue;
        }
        if wc_sku.is_empty() || evosus_sku.is_empty() {
            rows.push(ImportRow::Invalid(format!("Line {line}: both SKU columns are required")));
            continue;
        }

        let product_id = match record.get(2).filter(|raw| !raw.is_empty()) {
            None => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(line, raw, "ignoring non-numeric product id in sku import");
                    None
                }
            },
        };

        rows.push(ImportRow::Mapping {
            line,
            wc_sku: wc_sku.to_string(),
            evosus_sku: evosus_sku.to_string(),
            product_id,
        });
    }
    Ok(rows)
}

fn csv_error(err: csv::Error) -> EvosyncError {
    EvosyncError::InvalidInput(format!("CSV error: {err}"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use evosync_common::MockClock;

    use super::*;

    #[derive(Default)]
    struct MemorySkuRepo {
        rows: Mutex<BTreeMap<String, SkuMapping>>,
    }

    #[async_trait]
    impl SkuMappingRepository for MemorySkuRepo {
        async fn upsert(
            &self,
            wc_sku: &str,
            evosus_sku: &str,
            product_id: Option<i64>,
            created_at: i64,
        ) -> Result<SkuMapping> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.get(wc_sku).map_or(rows.len() as i64 + 1, |m| m.id);
            let mapping = SkuMapping {
                id,
                wc_sku: wc_sku.into(),
                evosus_sku: evosus_sku.into(),
                product_id,
                created_at,
            };
            rows.insert(wc_sku.into(), mapping.clone());
            Ok(mapping)
        }
        async fn find_by_wc_sku(&self, wc_sku: &str) -> Result<Option<SkuMapping>> {
            Ok(self.rows.lock().unwrap().get(wc_sku).cloned())
        }
        async fn find_by_evosus_sku(&self, evosus_sku: &str) -> Result<Option<SkuMapping>> {
            Ok(self.rows.lock().unwrap().values().find(|m| m.evosus_sku == evosus_sku).cloned())
        }
        async fn find_by_product(&self, product_id: i64) -> Result<Vec<SkuMapping>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.product_id == Some(product_id))
                .cloned()
                .collect())
        }
        async fn delete_by_wc_sku(&self, wc_sku: &str) -> Result<bool> {
            Ok(self.rows.lock().unwrap().remove(wc_sku).is_some())
        }
        async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|_, m| !ids.contains(&m.id));
            Ok((before - rows.len()) as u64)
        }
        async fn list(&self, limit: u32, offset: u32) -> Result<Vec<SkuMapping>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }
        async fn search(&self, term: &str, limit: u32) -> Result<Vec<SkuMapping>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.wc_sku.contains(term) || m.evosus_sku.contains(term))
                .take(limit as usize)
                .cloned()
                .collect())
        }
        async fn count(&self) -> Result<u64> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }
    }

    fn mapper() -> SkuMapper {
        SkuMapper::new(Arc::new(MemorySkuRepo::default()), Arc::new(MockClock::at(1_700_000_000)))
    }

    #[tokio::test]
    async fn unmapped_sku_passes_through() {
        let mapper = mapper();
        assert_eq!(mapper.get_evosus_sku("WIDGET-1").await.unwrap(), "WIDGET-1");
    }

    #[tokio::test]
    async fn mapping_lookup_is_case_sensitive() {
        let mapper = mapper();
        mapper.add_mapping("widget-1", "EV-WIDGET", None).await.unwrap();
        assert_eq!(mapper.get_evosus_sku("widget-1").await.unwrap(), "EV-WIDGET");
        assert_eq!(mapper.get_evosus_sku("WIDGET-1").await.unwrap(), "WIDGET-1");
    }

    #[tokio::test]
    async fn add_mapping_upserts_and_trims() {
        let mapper = mapper();
        mapper.add_mapping(" A-1 ", "EV-1", Some(3)).await.unwrap();
        mapper.add_mapping("A-1", "EV-2", Some(3)).await.unwrap();
        assert_eq!(mapper.count().await.unwrap(), 1);
        assert_eq!(mapper.get_evosus_sku("A-1").await.unwrap(), "EV-2");
    }

    #[tokio::test]
    async fn add_mapping_rejects_blank_values() {
        let mapper = mapper();
        let err = mapper.add_mapping("A-1", "  ", None).await.unwrap_err();
        assert!(matches!(err, EvosyncError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn csv_import_skips_header_and_reports_bad_rows() {
        let mapper = mapper();
        let csv = "wc_sku,evosus_sku,product_id\nA-1,EV-1,10\n,,\nB-2,,\nC-3,EV-3,abc\n";
        let report = mapper.import_csv(csv.as_bytes()).await.unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(mapper.get_mapping("A-1").await.unwrap().unwrap().product_id, Some(10));
        assert_eq!(mapper.get_mapping("C-3").await.unwrap().unwrap().product_id, None);
    }

    #[tokio::test]
    async fn csv_export_writes_header_and_rows() {
        let mapper = mapper();
        mapper.add_mapping("A-1", "EV-1", Some(10)).await.unwrap();
        mapper.add_mapping("B-2", "EV-2", None).await.unwrap();

        let mut out = Vec::new();
        let rows = mapper.export_csv(&mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(rows, 2);
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("WooCommerce SKU,Evosus SKU,Product ID,Created At"));
        assert_eq!(lines.next(), Some("A-1,EV-1,10,2023-11-14 22:13:20"));
        assert_eq!(lines.next(), Some("B-2,EV-2,,2023-11-14 22:13:20"));
    }

    #[test]
    fn only_csv_files_are_importable() {
        assert!(ensure_csv_path(Path::new("mappings.csv")).is_ok());
        assert!(ensure_csv_path(Path::new("MAPPINGS.CSV")).is_ok());
        assert!(ensure_csv_path(Path::new("mappings.xlsx")).is_err());
        assert!(ensure_csv_path(Path::new("mappings")).is_err());
    }
}
