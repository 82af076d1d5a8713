//! SQLite storage primitives
//!
//! r2d2 pooling with per-connection pragmas. Schema ownership stays with the
//! application layer.

pub mod config;
pub mod error;
pub mod pool;
pub mod pragmas;

pub use config::SqlitePoolConfig;
pub use error::{StorageError, StorageResult};
pub use pool::{PooledConnection, SqlitePool};
