//! In-memory implementations of the storage ports

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use evosync_core::{LogRepository, OrderStore, QueueRepository, SkuMappingRepository};
use evosync_domain::{
    JobStatus, LogEntry, LogFilter, LogStat, Order, QueueJob, QueueStats, Result, SkuMapping,
    SyncRecord,
};

#[derive(Default)]
pub struct MemoryLogs {
    pub entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogs {
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().unwrap().iter().map(|e| e.message.clone()).collect()
    }

    pub fn dump(&self) -> String {
        serde_json::to_string(&*self.entries.lock().unwrap()).unwrap()
    }
}

#[async_trait]
impl LogRepository for MemoryLogs {
    async fn insert(&self, entry: &LogEntry) -> Result<i64> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry.clone());
        Ok(entries.len() as i64)
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| filter.order_id.map_or(true, |id| e.order_id == Some(id)))
            .filter(|e| filter.log_type.map_or(true, |t| e.log_type == t))
            .filter(|e| filter.severity.map_or(true, |s| e.severity == s))
            .take(filter.limit as usize)
            .cloned()
            .collect())
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.created_at >= cutoff);
        Ok((before - entries.len()) as u64)
    }

    async fn stats_since(&self, since: i64) -> Result<Vec<LogStat>> {
        let mut counts: BTreeMap<(String, String), LogStat> = BTreeMap::new();
        for entry in self.entries.lock().unwrap().iter().filter(|e| e.created_at >= since) {
            counts
                .entry((entry.log_type.to_string(), entry.severity.to_string()))
                .or_insert(LogStat { log_type: entry.log_type, severity: entry.severity, count: 0 })
                .count += 1;
        }
        Ok(counts.into_values().collect())
    }
}

#[derive(Default)]
pub struct MemorySkuRepo {
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
        Ok(self.rows.lock().unwrap().values().skip(offset as usize).take(limit as usize).cloned().collect())
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

#[derive(Default)]
pub struct MemoryOrderStore {
    pub orders: Mutex<BTreeMap<i64, Order>>,
    pub records: Mutex<BTreeMap<i64, SyncRecord>>,
    pub notes: Mutex<Vec<(i64, String)>>,
    /// `(product_id, sku, stock)`
    pub products: Mutex<Vec<(i64, String, i64)>>,
}

impl MemoryOrderStore {
    pub fn insert(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id, order);
    }

    pub fn add_product(&self, product_id: i64, sku: &str, stock: i64) {
        self.products.lock().unwrap().push((product_id, sku.into(), stock));
    }

    pub fn record(&self, order_id: i64) -> SyncRecord {
        self.records.lock().unwrap().get(&order_id).cloned().unwrap_or_default()
    }

    pub fn notes_for(&self, order_id: i64) -> Vec<String> {
        self.notes.lock().unwrap().iter().filter(|(id, _)| *id == order_id).map(|(_, n)| n.clone()).collect()
    }

    pub fn stock(&self, product_id: i64) -> Option<i64> {
        self.products.lock().unwrap().iter().find(|(id, _, _)| *id == product_id).map(|(_, _, s)| *s)
    }

    pub fn status(&self, order_id: i64) -> Option<String> {
        self.orders.lock().unwrap().get(&order_id).map(|o| o.status.clone())
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn get_order(&self, order_id: i64) -> Result<Option<Order>> {
        Ok(self.orders.lock().unwrap().get(&order_id).cloned())
    }

    async fn get_sync_record(&self, order_id: i64) -> Result<SyncRecord> {
        Ok(self.record(order_id))
    }

    async fn save_sync_record(&self, order_id: i64, record: &SyncRecord) -> Result<()> {
        self.records.lock().unwrap().insert(order_id, record.clone());
        Ok(())
    }

    async fn add_order_note(&self, order_id: i64, note: &str) -> Result<()> {
        self.notes.lock().unwrap().push((order_id, note.into()));
        Ok(())
    }

    async fn set_item_sku_override(&self, order_id: i64, item_id: i64, sku: Option<&str>) -> Result<bool> {
        let mut orders = self.orders.lock().unwrap();
        let Some(item) = orders
            .get_mut(&order_id)
            .and_then(|order| order.items.iter_mut().find(|item| item.id == item_id))
        else {
            return Ok(false);
        };
        item.sku_override = sku.map(str::to_string);
        Ok(true)
    }

    async fn list_order_ids(&self, status: Option<&str>, limit: u32, unsynced_only: bool) -> Result<Vec<i64>> {
        let records = self.records.lock().unwrap();
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .rev()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .filter(|o| !unsynced_only || !records.get(&o.id).is_some_and(|r| r.synced))
            .take(limit as usize)
            .map(|o| o.id)
            .collect())
    }

    async fn list_needing_review(&self) -> Result<Vec<(Order, SyncRecord)>> {
        let orders = self.orders.lock().unwrap();
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.needs_review)
            .filter_map(|(id, r)| orders.get(id).map(|o| (o.clone(), r.clone())))
            .collect())
    }

    async fn list_synced_since(&self, since: i64) -> Result<Vec<(Order, SyncRecord)>> {
        let orders = self.orders.lock().unwrap();
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r.synced && r.sync_date.is_some_and(|d| d >= since))
            .filter_map(|(id, r)| orders.get(id).map(|o| (o.clone(), r.clone())))
            .collect())
    }

    async fn find_by_evosus_order_id(&self, evosus_order_id: &str) -> Result<Option<i64>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|(_, r)| r.evosus_order_id.as_deref() == Some(evosus_order_id))
            .map(|(id, _)| *id))
    }

    async fn update_status(&self, order_id: i64, status: &str) -> Result<()> {
        if let Some(order) = self.orders.lock().unwrap().get_mut(&order_id) {
            order.status = status.into();
        }
        Ok(())
    }

    async fn find_product_by_sku(&self, sku: &str) -> Result<Option<i64>> {
        Ok(self.products.lock().unwrap().iter().find(|(_, s, _)| s == sku).map(|(id, _, _)| *id))
    }

    async fn set_product_stock(&self, product_id: i64, quantity: i64) -> Result<()> {
        if let Some(row) = self.products.lock().unwrap().iter_mut().find(|(id, _, _)| *id == product_id) {
            row.2 = quantity;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryQueue {
    pub jobs: Mutex<BTreeMap<i64, QueueJob>>,
}

impl MemoryQueue {
    pub fn job(&self, job_id: i64) -> QueueJob {
        self.jobs.lock().unwrap()[&job_id].clone()
    }
}

#[async_trait]
impl QueueRepository for MemoryQueue {
    async fn insert(&self, order_id: i64, priority: i64, scheduled_at: i64, created_at: i64) -> Result<i64> {
        let mut jobs = self.jobs.lock().unwrap();
        let id = jobs.len() as i64 + 1;
        jobs.insert(
            id,
            QueueJob {
                id,
                order_id,
                status: JobStatus::Pending,
                priority,
                attempts: 0,
                scheduled_at,
                started_at: None,
                completed_at: None,
                result: None,
                error_message: None,
                created_at,
                retryable: true,
            },
        );
        Ok(id)
    }

    async fn get(&self, job_id: i64) -> Result<Option<QueueJob>> {
        Ok(self.jobs.lock().unwrap().get(&job_id).cloned())
    }

    async fn due_pending(&self, now: i64, limit: u32) -> Result<Vec<QueueJob>> {
        let mut due: Vec<QueueJob> = self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.status == JobStatus::Pending && j.scheduled_at <= now)
            .cloned()
            .collect();
        due.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at)));
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn claim(&self, job_id: i64, now: i64) -> Result<bool> {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&job_id) {
            Some(job) if job.status == JobStatus::Pending => {
                job.status = JobStatus::Processing;
                job.started_at = Some(now);
                job.attempts += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete(&self, job_id: i64, now: i64, result: &str) -> Result<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&job_id) {
            job.status = JobStatus::Completed;
            job.completed_at = Some(now);
            job.result = Some(result.into());
        }
        Ok(())
    }

    async fn fail(&self, job_id: i64, now: i64, error: &str, retryable: bool) -> Result<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&job_id) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(now);
            job.error_message = Some(error.into());
            job.retryable = retryable;
        }
        Ok(())
    }

    async fn retryable_failed(&self, max_attempts: i64, now: i64, limit: u32) -> Result<Vec<QueueJob>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .filter(|j| j.can_retry(max_attempts) && j.scheduled_at <= now)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn reschedule(&self, job_id: i64, scheduled_at: i64) -> Result<()> {
        if let Some(job) = self.jobs.lock().unwrap().get_mut(&job_id) {
            job.status = JobStatus::Pending;
            job.scheduled_at = scheduled_at;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<QueueStats> {
        let mut stats = QueueStats::default();
        for job in self.jobs.lock().unwrap().values() {
            stats.record(job.status, 1);
        }
        Ok(stats)
    }

    async fn list(&self, status: Option<JobStatus>, limit: u32) -> Result<Vec<QueueJob>> {
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .values()
            .rev()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn latest_for_order(&self, order_id: i64) -> Result<Option<QueueJob>> {
        Ok(self.jobs.lock().unwrap().values().rev().find(|j| j.order_id == order_id).cloned())
    }

    async fn delete_pending(&self, job_id: i64) -> Result<bool> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.get(&job_id).is_some_and(|j| j.status == JobStatus::Pending) {
            jobs.remove(&job_id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn delete_completed_before(&self, cutoff: i64) -> Result<u64> {
        let mut jobs = self.jobs.lock().unwrap();
        let before = jobs.len();
        jobs.retain(|_, j| !(j.status == JobStatus::Completed && j.completed_at.is_some_and(|c| c < cutoff)));
        Ok((before - jobs.len()) as u64)
    }
}
