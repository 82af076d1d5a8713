//! Privacy helpers
//!
//! Everything written to the audit trail or to process logs passes through
//! [`redact`] first.

pub mod redact;
