//! Order validation against Evosus inventory

mod service;
mod suggestions;

pub use service::OrderValidator;
pub use suggestions::sku_variants;
