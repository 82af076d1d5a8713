//! Operator reports over sync metadata, the queue and the audit trail

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use evosync_common::Clock;
use evosync_domain::{QueueStats, Result, ReviewSummary, SyncedOrderSummary};
use serde::{Deserialize, Serialize};

use crate::audit::AuditLogger;
use crate::orders::ports::OrderStore;
use crate::queue::ports::QueueRepository;

/// Dashboard counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub synced_today: u64,
    pub synced_this_week: u64,
    pub needing_review: u64,
    pub queue: QueueStats,
    /// Audit entries per log type over the stats window.
    pub logs_by_type: BTreeMap<String, u64>,
}

pub struct SyncReporter {
    store: Arc<dyn OrderStore>,
    queue: Arc<dyn QueueRepository>,
    audit: Arc<AuditLogger>,
    clock: Arc<dyn Clock>,
}

impl SyncReporter {
    pub fn new(
        store: Arc<dyn OrderStore>,
        queue: Arc<dyn QueueRepository>,
        audit: Arc<AuditLogger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, queue, audit, clock }
    }

    /// # Errors
    /// Storage faults.
    pub async fn synced_today(&self) -> Result<Vec<SyncedOrderSummary>> {
        self.synced_since(start_of_day(self.clock.now_unix())).await
    }

    /// Orders synced since Monday 00:00 UTC.
    ///
    /// # Errors
    /// Storage faults.
    pub async fn synced_this_week(&self) -> Result<Vec<SyncedOrderSummary>> {
        self.synced_since(start_of_week(self.clock.now_unix())).await
    }

    /// # Errors
    /// Storage faults.
    pub async fn needing_review(&self) -> Result<Vec<ReviewSummary>> {
        let rows = self.store.list_needing_review().await?;
        Ok(rows
            .into_iter()
            .map(|(order, record)| ReviewSummary {
                order_id: order.id,
                customer_name: order.billing.full_name(),
                order_number: order.number,
                total: order.total,
                review_date: record.review_date,
                issues: record.review_issues,
            })
            .collect())
    }

    /// Combined counters; log counts cover the last `log_days` days.
    ///
    /// # Errors
    /// Storage faults.
    pub async fn stats(&self, log_days: u32) -> Result<SyncReport> {
        let now = self.clock.now_unix();
        let synced_today = self.store.list_synced_since(start_of_day(now)).await?.len() as u64;
        let synced_this_week = self.store.list_synced_since(start_of_week(now)).await?.len() as u64;
        let needing_review = self.store.list_needing_review().await?.len() as u64;
        let queue = self.queue.stats().await?;

        let mut logs_by_type = BTreeMap::new();
        for stat in self.audit.get_stats(log_days).await? {
            *logs_by_type.entry(stat.log_type.to_string()).or_insert(0) += stat.count;
        }

        Ok(SyncReport { synced_today, synced_this_week, needing_review, queue, logs_by_type })
    }

    async fn synced_since(&self, since: i64) -> Result<Vec<SyncedOrderSummary>> {
        let rows = self.store.list_synced_since(since).await?;
        Ok(rows
            .into_iter()
            .map(|(order, record)| SyncedOrderSummary {
                order_id: order.id,
                customer_name: order.billing.full_name(),
                order_number: order.number,
                evosus_order_id: record.evosus_order_id.unwrap_or_default(),
                sync_date: record.sync_date.unwrap_or_default(),
                total: order.total,
                created_at: order.created_at,
            })
            .collect())
    }
}

fn start_of_day(now: i64) -> i64 {
    DateTime::<Utc>::from_timestamp(now, 0)
        .map_or(now, |at| at.date_naive().and_time(NaiveTime::MIN).and_utc().timestamp())
}

fn start_of_week(now: i64) -> i64 {
    DateTime::<Utc>::from_timestamp(now, 0)
        .and_then(|at| {
            let date = at.date_naive();
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        })
        .map_or(now, |monday| monday.and_time(NaiveTime::MIN).and_utc().timestamp())
}
