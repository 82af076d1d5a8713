//! # Evosync Domain
//!
//! Business domain types for the WooCommerce → Evosus order sync engine.
//!
//! This crate contains:
//! - Storefront order snapshots and their sync metadata
//! - Validation issues, queue jobs, audit log entries, SKU mappings
//! - Typed Evosus request/response records
//! - Domain error types and Result definitions
//! - Configuration structures
//!
//! ## Architecture
//! - No dependencies on other Evosync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
