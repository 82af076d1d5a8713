//! Audit trail

pub mod ports;
mod service;

pub use service::{ApiCallRecord, AuditLogger};
