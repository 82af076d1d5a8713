//! Shared utilities for the Evosync crates.
//!
//! # Feature Tiers
//!
//! - `foundation`: payload redaction and the clock abstraction
//! - `platform`: SQLite connection pooling

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "foundation")]
pub mod privacy;
#[cfg(feature = "platform")]
pub mod storage;
#[cfg(feature = "foundation")]
pub mod time;

#[cfg(feature = "foundation")]
pub use privacy::redact::{is_sensitive_key, redact_text, redact_value, redacted_json};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
