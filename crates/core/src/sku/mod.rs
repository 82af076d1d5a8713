//! Storefront SKU → Evosus item code mapping

pub mod ports;
mod service;

pub use service::{ensure_csv_path, SkuMapper, CSV_EXPORT_HEADER};
