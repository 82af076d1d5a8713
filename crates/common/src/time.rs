//! Wall-clock abstraction for testability
//!
//! Queue scheduling, retention sweeps and sync timestamps all read "now"
//! through [`Clock`], so tests can move time forward without sleeping.
//!
//! ```
//! use evosync_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at(1_700_000_000);
//! clock.advance_minutes(5);
//! assert_eq!(clock.now_unix(), 1_700_000_300);
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time in unix seconds
pub trait Clock: Send + Sync {
    fn now_unix(&self) -> i64;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Manually advanced clock shared between clones
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<AtomicI64>,
}

impl MockClock {
    pub fn at(unix_seconds: i64) -> Self {
        Self { now: Arc::new(AtomicI64::new(unix_seconds)) }
    }

    pub fn set(&self, unix_seconds: i64) {
        self.now.store(unix_seconds, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance_secs(minutes * 60);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::at(SystemClock.now_unix())
    }
}

impl Clock for MockClock {
    fn now_unix(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = MockClock::at(100);
        let other = clock.clone();
        clock.advance_secs(20);
        assert_eq!(other.now_unix(), 120);
        other.set(5);
        assert_eq!(clock.now_unix(), 5);
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now_unix() > 1_577_836_800);
    }
}
