//! SQLite implementation of the sync queue port.
//!
//! `claim` is a conditional update on `status = 'pending'`, so two workers
//! racing for the same job cannot both move it to `processing`.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_core::QueueRepository;
use evosync_domain::{JobStatus, QueueJob, QueueStats, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use super::manager::{map_sql_error, with_connection, DbManager};

pub struct SqliteQueueRepository {
    db: Arc<DbManager>,
}

impl SqliteQueueRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn query_jobs(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<QueueJob>> {
        let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
        let rows = stmt.query_map(params, map_job_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }

    fn query_job(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Option<QueueJob>> {
        conn.query_row(sql, params, map_job_row).optional().map_err(map_sql_error)
    }

    fn collect_stats(conn: &Connection) -> Result<QueueStats> {
        let mut stmt = conn
            .prepare("SELECT status, COUNT(*) FROM queue_jobs GROUP BY status")
            .map_err(map_sql_error)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(map_sql_error)?;

        let mut stats = QueueStats::default();
        for row in rows {
            let (raw, count) = row.map_err(map_sql_error)?;
            match raw.parse::<JobStatus>() {
                Ok(status) => stats.record(status, count.max(0) as u64),
                Err(err) => warn!(raw_status = %raw, error = %err, "ignoring unknown queue status"),
            }
        }
        Ok(stats)
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
impl QueueRepository for SqliteQueueRepository {
    async fn insert(
        &self,
        order_id: i64,
        priority: i64,
        scheduled_at: i64,
        created_at: i64,
    ) -> Result<i64> {
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO queue_jobs (order_id, status, priority, attempts, scheduled_at, created_at)
                 VALUES (?1, 'pending', ?2, 0, ?3, ?4)",
                params![order_id, priority, scheduled_at, created_at],
            )
            .map_err(map_sql_error)?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn get(&self, job_id: i64) -> Result<Option<QueueJob>> {
        self.run(move |conn| Self::query_job(conn, &format!("{SELECT_SQL} WHERE id = ?1"), params![job_id]))
            .await
    }

    async fn due_pending(&self, now: i64, limit: u32) -> Result<Vec<QueueJob>> {
        self.run(move |conn| {
            Self::query_jobs(
                conn,
                &format!(
                    "{SELECT_SQL} WHERE status = 'pending' AND scheduled_at <= ?1
                     ORDER BY priority DESC, created_at ASC, id ASC LIMIT ?2"
                ),
                params![now, limit],
            )
        })
        .await
    }

    async fn claim(&self, job_id: i64, now: i64) -> Result<bool> {
        self.run(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE queue_jobs
                     SET status = 'processing', attempts = attempts + 1, started_at = ?2
                     WHERE id = ?1 AND status = 'pending'",
                    params![job_id, now],
                )
                .map_err(map_sql_error)?;
            Ok(updated == 1)
        })
        .await
    }

    async fn complete(&self, job_id: i64, now: i64, result: &str) -> Result<()> {
        let result = result.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE queue_jobs
                 SET status = 'completed', completed_at = ?2, result = ?3, error_message = NULL
                 WHERE id = ?1",
                params![job_id, now, result],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn fail(&self, job_id: i64, now: i64, error: &str, retryable: bool) -> Result<()> {
        let error = error.to_string();
        self.run(move |conn| {
            conn.execute(
                "UPDATE queue_jobs
                 SET status = 'failed', completed_at = ?2, error_message = ?3, retryable = ?4
                 WHERE id = ?1",
                params![job_id, now, error, retryable],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn retryable_failed(&self, max_attempts: i64, now: i64, limit: u32) -> Result<Vec<QueueJob>> {
        self.run(move |conn| {
            Self::query_jobs(
                conn,
                &format!(
                    "{SELECT_SQL} WHERE status = 'failed' AND retryable = 1 AND attempts < ?1 AND scheduled_at <= ?2
                     ORDER BY created_at ASC, id ASC LIMIT ?3"
                ),
                params![max_attempts, now, limit],
            )
        })
        .await
    }

    async fn reschedule(&self, job_id: i64, scheduled_at: i64) -> Result<()> {
        self.run(move |conn| {
            conn.execute(
                "UPDATE queue_jobs SET status = 'pending', scheduled_at = ?2 WHERE id = ?1",
                params![job_id, scheduled_at],
            )
            .map_err(map_sql_error)?;
            Ok(())
        })
        .await
    }

    async fn stats(&self) -> Result<QueueStats> {
        self.run(Self::collect_stats).await
    }

    async fn list(&self, status: Option<JobStatus>, limit: u32) -> Result<Vec<QueueJob>> {
        self.run(move |conn| match status {
            Some(status) => Self::query_jobs(
                conn,
                &format!("{SELECT_SQL} WHERE status = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2"),
                params![status.to_string(), limit],
            ),
            None => Self::query_jobs(
                conn,
                &format!("{SELECT_SQL} ORDER BY created_at DESC, id DESC LIMIT ?1"),
                params![limit],
            ),
        })
        .await
    }

    async fn latest_for_order(&self, order_id: i64) -> Result<Option<QueueJob>> {
        self.run(move |conn| {
            Self::query_job(
                conn,
                &format!("{SELECT_SQL} WHERE order_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1"),
                params![order_id],
            )
        })
        .await
    }

    async fn delete_pending(&self, job_id: i64) -> Result<bool> {
        self.run(move |conn| {
            let deleted = conn
                .execute("DELETE FROM queue_jobs WHERE id = ?1 AND status = 'pending'", params![job_id])
                .map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn delete_completed_before(&self, cutoff: i64) -> Result<u64> {
        self.run(move |conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM queue_jobs WHERE status = 'completed' AND completed_at < ?1",
                    params![cutoff],
                )
                .map_err(map_sql_error)?;
            Ok(deleted as u64)
        })
        .await
    }
}

const SELECT_SQL: &str = "SELECT id, order_id, status, priority, attempts, scheduled_at, started_at,
        completed_at, result, error_message, created_at, retryable
    FROM queue_jobs";

fn map_job_row(row: &Row<'_>) -> rusqlite::Result<QueueJob> {
    let id: i64 = row.get(0)?;
    let status_raw: String = row.get(2)?;
    Ok(QueueJob {
        id,
        order_id: row.get(1)?,
        status: parse_status(id, &status_raw),
        priority: row.get(3)?,
        attempts: row.get(4)?,
        scheduled_at: row.get(5)?,
        started_at: row.get(6)?,
        completed_at: row.get(7)?,
        result: row.get(8)?,
        error_message: row.get(9)?,
        created_at: row.get(10)?,
        retryable: row.get(11)?,
    })
}

fn parse_status(id: i64, raw: &str) -> JobStatus {
    match raw.parse::<JobStatus>() {
        Ok(status) => status,
        Err(err) => {
            warn!(job_id = id, raw_status = %raw, error = %err, "invalid queue status - treating as failed");
            JobStatus::Failed
        }
    }
}
