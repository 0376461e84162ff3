//! Poll cycle - core ingestion logic
//!
//! A cycle pages through the source starting at a cursor, narrows each raw
//! record into an [`Event`], and appends the novel ones to the store. The
//! scheduler in the infra crate decides *when* cycles run; this module
//! decides what a single cycle does.

use std::sync::Arc;

use repopulse_domain::{parse_event, ParseError, PollerConfig, RawEvent};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use super::ports::{Cursor, EventSource, FetchError, RateLimitInfo};
use crate::clock::Clock;
use crate::store::RetentionStore;

/// Tunables for a single cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    /// Upper bound on pages fetched per cycle.
    pub max_pages_per_cycle: u32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self { max_pages_per_cycle: PollerConfig::default().max_pages_per_cycle }
    }
}

impl From<&PollerConfig> for PollerSettings {
    fn from(config: &PollerConfig) -> Self {
        Self { max_pages_per_cycle: config.max_pages_per_cycle }
    }
}

/// Why a cycle stopped paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source returned an empty page (nothing new, or not modified).
    NoNewEvents,
    /// Every event on the last page was already retained.
    CaughtUp,
    /// The source reported no further pages.
    Exhausted,
    /// The per-cycle page limit was reached.
    PageLimit,
    /// Shutdown was requested between pages.
    Cancelled,
}

/// Counters accumulated over one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub pages: u32,
    /// Raw records received.
    pub fetched: usize,
    /// Events newly appended to the store.
    pub inserted: usize,
    /// Parsed events whose id was already retained.
    pub duplicates: usize,
    pub unsupported: usize,
    pub malformed: usize,
    pub evicted: usize,
}

/// Result of a completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// Cursor the next cycle should start from.
    pub cursor: Cursor,
    pub stats: CycleStats,
    pub stop_reason: StopReason,
    /// Most recent rate-limit metadata seen during the cycle.
    pub rate_limit: Option<RateLimitInfo>,
}

impl CycleReport {
    pub fn fetched(&self) -> usize {
        self.stats.fetched
    }

    pub fn inserted(&self) -> usize {
        self.stats.inserted
    }
}

/// A cycle that hit a fetch error.
///
/// Pages processed before the failure stay ingested; the failed page made no
/// store mutation. Callers keep their previous cursor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("poll cycle failed after {} page(s): {source}", stats.pages)]
pub struct CycleFailure {
    pub source: FetchError,
    pub stats: CycleStats,
}

#[derive(Debug, Default)]
struct PageOutcome {
    parsed: usize,
    inserted: usize,
}

/// Moves events from an [`EventSource`] into the [`RetentionStore`].
pub struct Poller {
    source: Arc<dyn EventSource>,
    store: Arc<RetentionStore>,
    clock: Arc<dyn Clock>,
    settings: PollerSettings,
}

impl Poller {
    pub fn new(
        source: Arc<dyn EventSource>,
        store: Arc<RetentionStore>,
        clock: Arc<dyn Clock>,
        settings: PollerSettings,
    ) -> Self {
        Self { source, store, clock, settings }
    }

    pub fn store(&self) -> &Arc<RetentionStore> {
        &self.store
    }

    /// Run one ingestion cycle starting at `since`.
    ///
    /// Paging stops on an empty page, a page with no new events, the end of
    /// the feed, the page limit, or cancellation. Cancellation is only checked
    /// between pages. Expired events are evicted once at least one page has
    /// been processed.
    ///
    /// # Errors
    /// Returns [`CycleFailure`] when a page fetch fails.
    #[instrument(skip(self, cancel), fields(since = %since))]
    pub async fn run_cycle(
        &self,
        since: &Cursor,
        cancel: &CancellationToken,
    ) -> Result<CycleReport, CycleFailure> {
        let max_pages = self.settings.max_pages_per_cycle.max(1);
        let mut stats = CycleStats::default();
        let mut page_cursor = since.clone();
        let mut resume_from = since.clone();
        let mut rate_limit = None;

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if stats.pages >= max_pages {
                break StopReason::PageLimit;
            }

            let page = match self.source.fetch_page(&page_cursor).await {
                Ok(page) => page,
                Err(source) => {
                    warn!(error = %source, cursor = %page_cursor, pages = stats.pages, "page fetch failed");
                    self.evict_after(&mut stats);
                    return Err(CycleFailure { source, stats });
                }
            };

            stats.pages += 1;
            stats.fetched += page.records.len();
            rate_limit = page.rate_limit.or(rate_limit);
            resume_from = page.resume_from;

            if page.records.is_empty() {
                break StopReason::NoNewEvents;
            }

            let outcome = self.ingest_page(&page.records, &mut stats);
            debug!(
                page = stats.pages,
                records = page.records.len(),
                parsed = outcome.parsed,
                inserted = outcome.inserted,
                "ingested page"
            );

            if outcome.parsed > 0 && outcome.inserted == 0 {
                break StopReason::CaughtUp;
            }

            match page.next_page {
                Some(next) => page_cursor = next,
                None => break StopReason::Exhausted,
            }
        };

        self.evict_after(&mut stats);
        Ok(CycleReport { cursor: resume_from, stats, stop_reason, rate_limit })
    }

    fn ingest_page(&self, records: &[RawEvent], stats: &mut CycleStats) -> PageOutcome {
        let mut outcome = PageOutcome::default();

        for raw in records {
            match parse_event(raw) {
                Ok(event) => {
                    outcome.parsed += 1;
                    if self.store.append(event) {
                        outcome.inserted += 1;
                    } else {
                        stats.duplicates += 1;
                    }
                }
                Err(ParseError::UnsupportedType(tag)) => {
                    trace!(%tag, "skipping unmonitored event type");
                    stats.unsupported += 1;
                }
                Err(err @ ParseError::Malformed { .. }) => {
                    warn!(error = %err, id = ?raw.id, "dropping malformed event");
                    stats.malformed += 1;
                }
            }
        }

        stats.inserted += outcome.inserted;
        outcome
    }

    fn evict_after(&self, stats: &mut CycleStats) {
        if stats.pages > 0 {
            stats.evicted = self.store.evict_expired(self.clock.now());
        }
    }
}
