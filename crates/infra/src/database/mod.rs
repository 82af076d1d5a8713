//! SQLite persistence
//!
//! One [`DbManager`] owns the pool and schema; each repository implements a
//! core port over it and runs its queries on the blocking thread pool.

pub mod log_repository;
pub mod manager;
pub mod order_store;
pub mod queue_repository;
pub mod sku_mapping_repository;

pub use log_repository::SqliteLogRepository;
pub use manager::DbManager;
pub use order_store::{ImportSummary, ProductRecord, SqliteOrderStore, StorefrontExport};
pub use queue_repository::SqliteQueueRepository;
pub use sku_mapping_repository::SqliteSkuMappingRepository;
