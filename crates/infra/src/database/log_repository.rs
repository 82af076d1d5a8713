//! SQLite implementation of the audit log port.

use std::sync::Arc;

use async_trait::async_trait;
use evosync_core::LogRepository;
use evosync_domain::{LogEntry, LogFilter, LogSeverity, LogStat, LogType, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::warn;

use super::manager::{map_sql_error, with_connection, DbManager};

pub struct SqliteLogRepository {
    db: Arc<DbManager>,
}

impl SqliteLogRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    fn insert_entry(conn: &Connection, entry: &LogEntry) -> Result<i64> {
        conn.execute(
            INSERT_SQL,
            params![
                entry.log_type.to_string(),
                entry.severity.to_string(),
                entry.message,
                entry.endpoint,
                entry.method,
                entry.request_data,
                entry.response_data,
                entry.status_code,
                entry.execution_time,
                entry.context,
                entry.order_id,
                entry.evosus_order_id,
                entry.created_at,
            ],
        )
        .map_err(map_sql_error)?;
        Ok(conn.last_insert_rowid())
    }

    fn query_entries(conn: &Connection, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let mut clauses = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(log_type) = filter.log_type {
            clauses.push("log_type = ?");
            values.push(SqlValue::Text(log_type.to_string()));
        }
        if let Some(severity) = filter.severity {
            clauses.push("severity = ?");
            values.push(SqlValue::Text(severity.to_string()));
        }
        if let Some(order_id) = filter.order_id {
            clauses.push("order_id = ?");
            values.push(SqlValue::Integer(order_id));
        }
        if let Some(since) = filter.since {
            clauses.push("created_at >= ?");
            values.push(SqlValue::Integer(since));
        }
        if let Some(until) = filter.until {
            clauses.push("created_at <= ?");
            values.push(SqlValue::Integer(until));
        }

        let mut sql = SELECT_SQL.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        values.push(SqlValue::Integer(i64::from(filter.limit)));
        values.push(SqlValue::Integer(i64::from(filter.offset)));

        let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
        let rows = stmt.query_map(params_from_iter(values), map_log_row).map_err(map_sql_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
    }

    fn collect_stats(conn: &Connection, since: i64) -> Result<Vec<LogStat>> {
        let mut stmt = conn
            .prepare(
                "SELECT log_type, severity, COUNT(*) FROM logs
                 WHERE created_at >= ?1
                 GROUP BY log_type, severity
                 ORDER BY log_type, severity",
            )
            .map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params![since], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(map_sql_error)?;

        let mut stats = Vec::new();
        for row in rows {
            let (log_type, severity, count) = row.map_err(map_sql_error)?;
            match (log_type.parse::<LogType>(), severity.parse::<LogSeverity>()) {
                (Ok(log_type), Ok(severity)) => {
                    stats.push(LogStat { log_type, severity, count: count.max(0) as u64 });
                }
                _ => warn!(%log_type, %severity, "skipping log stats row with unknown labels"),
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl LogRepository for SqliteLogRepository {
    async fn insert(&self, entry: &LogEntry) -> Result<i64> {
        let entry = entry.clone();
        with_connection(&self.db, move |conn| Self::insert_entry(conn, &entry)).await
    }

    async fn query(&self, filter: &LogFilter) -> Result<Vec<LogEntry>> {
        let filter = filter.clone();
        with_connection(&self.db, move |conn| Self::query_entries(conn, &filter)).await
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64> {
        with_connection(&self.db, move |conn| {
            let deleted = conn
                .execute("DELETE FROM logs WHERE created_at < ?1", params![cutoff])
                .map_err(map_sql_error)?;
            Ok(deleted as u64)
        })
        .await
    }

    async fn stats_since(&self, since: i64) -> Result<Vec<LogStat>> {
        with_connection(&self.db, move |conn| Self::collect_stats(conn, since)).await
    }
}

const INSERT_SQL: &str = "INSERT INTO logs (
        log_type, severity, message, endpoint, method, request_data, response_data,
        status_code, execution_time, context, order_id, evosus_order_id, created_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

const SELECT_SQL: &str = "SELECT id, log_type, severity, message, endpoint, method, request_data,
        response_data, status_code, execution_time, context, order_id, evosus_order_id, created_at
    FROM logs";

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<LogEntry> {
    let id: i64 = row.get(0)?;
    let log_type_raw: String = row.get(1)?;
    let severity_raw: String = row.get(2)?;
    Ok(LogEntry {
        id: Some(id),
        log_type: log_type_raw.parse().unwrap_or_else(|err| {
            warn!(log_id = id, raw = %log_type_raw, error = %err, "unknown log type - reading as info");
            LogType::Info
        }),
        severity: severity_raw.parse().unwrap_or_else(|err| {
            warn!(log_id = id, raw = %severity_raw, error = %err, "unknown severity - reading as info");
            LogSeverity::Info
        }),
        message: row.get(3)?,
        endpoint: row.get(4)?,
        method: row.get(5)?,
        request_data: row.get(6)?,
        response_data: row.get(7)?,
        status_code: row.get(8)?,
        execution_time: row.get(9)?,
        context: row.get(10)?,
        order_id: row.get(11)?,
        evosus_order_id: row.get(12)?,
        created_at: row.get(13)?,
    })
}
