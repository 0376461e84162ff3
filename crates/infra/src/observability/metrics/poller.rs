//! Poll cycle metrics
//!
//! ## Design
//! - **No locking needed** - simple atomic counters
//! - **Microsecond storage** - raw durations in µs, reporting helpers convert
//!   to ms

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use repopulse_core::{CycleStats, FetchError};
use serde::Serialize;

use crate::observability::{MetricsError, MetricsResult};

/// Counters describing the poller since process start.
#[derive(Debug, Default)]
pub struct PollerMetrics {
    /// Completed cycles, successful or not
    pub cycles: AtomicU64,
    pub failed_cycles: AtomicU64,
    /// Cycles abandoned after the cycle timeout
    pub timeouts: AtomicU64,
    pub rate_limited: AtomicU64,
    pub pages: AtomicU64,
    pub events_fetched: AtomicU64,
    pub events_inserted: AtomicU64,
    pub duplicates: AtomicU64,
    pub evicted: AtomicU64,
    pub total_cycle_time_micros: AtomicU64,
    pub last_cycle_time_micros: AtomicU64,
    /// Unix seconds of the last successful cycle, 0 if none
    pub last_success_unix: AtomicI64,
}

/// Point-in-time copy for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollerMetricsSnapshot {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub timeouts: u64,
    pub rate_limited: u64,
    pub pages: u64,
    pub events_fetched: u64,
    pub events_inserted: u64,
    pub duplicates: u64,
    pub evicted: u64,
    pub last_cycle_ms: u64,
    pub avg_cycle_ms: Option<f64>,
    pub last_success: Option<DateTime<Utc>>,
}

impl PollerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the counters of a cycle, successful or failed.
    pub fn record_cycle(&self, stats: &CycleStats, elapsed: Duration) -> MetricsResult<()> {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);

        // SeqCst for consistency with avg_cycle_time
        self.total_cycle_time_micros.fetch_add(micros, Ordering::SeqCst);
        self.cycles.fetch_add(1, Ordering::SeqCst);
        self.last_cycle_time_micros.store(micros, Ordering::Relaxed);

        self.pages.fetch_add(u64::from(stats.pages), Ordering::Relaxed);
        self.events_fetched.fetch_add(stats.fetched as u64, Ordering::Relaxed);
        self.events_inserted.fetch_add(stats.inserted as u64, Ordering::Relaxed);
        self.duplicates.fetch_add(stats.duplicates as u64, Ordering::Relaxed);
        self.evicted.fetch_add(stats.evicted as u64, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_success(&self, at: DateTime<Utc>) -> MetricsResult<()> {
        self.last_success_unix.store(at.timestamp(), Ordering::Relaxed);
        Ok(())
    }

    /// Record a failed cycle, classified by its error.
    pub fn record_failure(&self, error: &FetchError) -> MetricsResult<()> {
        self.failed_cycles.fetch_add(1, Ordering::Relaxed);
        match error {
            FetchError::RateLimited { .. } => self.record_rate_limited(),
            FetchError::Timeout(_) => self.record_timeout(),
            _ => Ok(()),
        }
    }

    pub fn record_rate_limited(&self) -> MetricsResult<()> {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn record_timeout(&self) -> MetricsResult<()> {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Average cycle duration.
    ///
    /// # Errors
    /// `MetricsError::EmptyData` before the first cycle.
    pub fn avg_cycle_time(&self) -> MetricsResult<Duration> {
        let total = self.total_cycle_time_micros.load(Ordering::SeqCst);
        let count = self.cycles.load(Ordering::SeqCst);
        if count == 0 {
            return Err(MetricsError::EmptyData { metric: "average cycle time" });
        }
        Ok(Duration::from_micros(total / count))
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        match self.last_success_unix.load(Ordering::Relaxed) {
            0 => None,
            secs => DateTime::<Utc>::from_timestamp(secs, 0),
        }
    }

    pub fn snapshot(&self) -> PollerMetricsSnapshot {
        PollerMetricsSnapshot {
            cycles: self.cycles.load(Ordering::SeqCst),
            failed_cycles: self.failed_cycles.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            events_fetched: self.events_fetched.load(Ordering::Relaxed),
            events_inserted: self.events_inserted.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            last_cycle_ms: self.last_cycle_time_micros.load(Ordering::Relaxed) / 1_000,
            avg_cycle_ms: self.avg_cycle_time().ok().map(|avg| avg.as_secs_f64() * 1_000.0),
            last_success: self.last_success(),
        }
    }
}
