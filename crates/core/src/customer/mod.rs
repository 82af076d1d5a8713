//! Evosus customer matching and creation

mod payload;
mod service;

pub use payload::{country_name, digits_only, new_customer_from_order};
pub use service::CustomerResolver;
