//! Tax code matching and `Customer_Order_Add` submission

mod service;
mod tax;

pub use service::{fallback_item_code, OrderSubmitter};
pub use tax::TaxCodeResolver;
