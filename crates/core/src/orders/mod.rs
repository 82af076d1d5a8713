//! Storefront order boundary

pub mod ports;
