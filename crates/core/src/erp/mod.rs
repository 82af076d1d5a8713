//! Evosus ERP port

pub mod ports;
