//! SQLite connection pool
//!
//! Thin r2d2 wrapper: every connection gets the configured pragmas, and
//! acquisition failures are classified into [`StorageError`] variants.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::config::SqlitePoolConfig;
use super::error::{StorageError, StorageResult};
use super::pragmas::apply_connection_pragmas;

/// Connection checked out of a [`SqlitePool`]; derefs to
/// [`rusqlite::Connection`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool of SQLite connections
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
}

impl SqlitePool {
    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or the pragmas fail.
    #[instrument(skip(config), fields(db_path = ?path, pool_size = config.max_size))]
    pub fn open(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        Self::build(SqliteConnectionManager::file(path), config)
    }

    fn build(manager: SqliteConnectionManager, config: SqlitePoolConfig) -> StorageResult<Self> {
        if config.max_size == 0 {
            return Err(StorageError::InvalidConfig("pool size must be at least 1".into()));
        }

        let pragma_config = config.clone();
        let manager = manager.with_init(move |conn| {
            apply_connection_pragmas(conn, &pragma_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "failed to create connection pool");
                StorageError::Connection(format!("Failed to create pool: {e}"))
            })?;

        info!(max_connections = config.max_size, "sqlite pool created");
        Ok(Self { pool, config })
    }

    /// Check out a connection.
    pub fn get(&self) -> StorageResult<PooledConnection> {
        let start = std::time::Instant::now();
        match self.pool.get() {
            Ok(conn) => {
                debug!(elapsed_ms = start.elapsed().as_millis() as u64, "connection acquired");
                Ok(conn)
            }
            Err(e) if e.to_string().to_lowercase().contains("timed out") => {
                warn!(timeout = ?self.config.connection_timeout, "connection timeout");
                Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
            }
            Err(e) => {
                warn!(error = %e, "connection error");
                Err(StorageError::Connection(format!("Failed to get connection: {e}")))
            }
        }
    }

    pub fn max_size(&self) -> u32 {
        self.config.max_size
    }
}
