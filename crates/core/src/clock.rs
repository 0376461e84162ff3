//! Wall-clock abstraction
//!
//! Retention and windowed queries are defined relative to "now". Routing that
//! through a trait lets tests pin time instead of sleeping.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock. Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same underlying instant, so a test can hand one copy to
/// the component under test and advance another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock();
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn manual_clock_advances_all_clones() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let shared = clock.clone();

        clock.advance(Duration::seconds(90));
        assert_eq!(shared.now(), start + Duration::seconds(90));

        shared.set(start);
        assert_eq!(clock.now(), start);
    }
}
