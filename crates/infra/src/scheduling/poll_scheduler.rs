//! Interval scheduler driving the poll cycle.
//!
//! The first cycle runs immediately after `start`. Each following cycle waits
//! for the configured interval, stretched to honour the source's requested
//! poll interval and, after a rate-limit failure, the quota reset time
//! (capped at `max_backoff`). Each cycle is bounded by `cycle_timeout`; a
//! timed-out or failed cycle keeps the previous cursor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use repopulse_core::{Clock, Cursor, CycleReport, FetchError, Poller, RateLimitInfo};
use repopulse_domain::PollerConfig;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::metrics::PollerMetrics;
use crate::observability::MetricsResult;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the poll scheduler
#[derive(Debug, Clone)]
pub struct PollSchedulerConfig {
    /// Minimum time between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Upper bound on a single cycle
    pub cycle_timeout: Duration,
    /// How long `stop` waits for the loop before aborting it
    pub shutdown_grace: Duration,
    /// Cap on the wait after a rate-limit failure
    pub max_backoff: Duration,
}

impl Default for PollSchedulerConfig {
    fn default() -> Self {
        Self::from(&PollerConfig::default())
    }
}

impl From<&PollerConfig> for PollSchedulerConfig {
    fn from(config: &PollerConfig) -> Self {
        Self {
            interval: config.interval(),
            cycle_timeout: config.cycle_timeout(),
            shutdown_grace: config.shutdown_grace(),
            max_backoff: config.max_backoff(),
        }
    }
}

/// Context for the poll loop to avoid too many arguments (clippy)
struct PollLoopContext {
    poller: Arc<Poller>,
    clock: Arc<dyn Clock>,
    metrics: Arc<PollerMetrics>,
}

/// Runs [`Poller::run_cycle`] periodically on the tokio runtime.
pub struct PollScheduler {
    poller: Arc<Poller>,
    clock: Arc<dyn Clock>,
    config: PollSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    metrics: Arc<PollerMetrics>,
}

impl PollScheduler {
    pub fn new(
        poller: Arc<Poller>,
        clock: Arc<dyn Clock>,
        config: PollSchedulerConfig,
        metrics: Arc<PollerMetrics>,
    ) -> Self {
        Self {
            poller,
            clock,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<PollerMetrics> {
        &self.metrics
    }

    /// Start the scheduler
    ///
    /// Spawns a background task that polls immediately, then periodically.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "Starting poll scheduler");

        // Create a new cancellation token (supports restart after stop)
        self.cancellation_token = CancellationToken::new();

        let context = PollLoopContext {
            poller: Arc::clone(&self.poller),
            clock: Arc::clone(&self.clock),
            metrics: Arc::clone(&self.metrics),
        };
        let config = self.config.clone();
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::poll_loop(context, config, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);

        info!("Poll scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// Cancels the loop and waits up to `shutdown_grace` for the in-flight
    /// cycle to finish before aborting the task.
    ///
    /// # Errors
    ///
    /// Returns error if scheduler is not running, or the task had to be
    /// aborted after the grace period.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping poll scheduler");
        self.cancellation_token.cancel();

        if let Some(mut handle) = self.task_handle.lock().await.take() {
            let grace = self.config.shutdown_grace;
            match tokio::time::timeout(grace, &mut handle).await {
                Ok(joined) => joined?,
                Err(_) => {
                    warn!(grace_ms = grace.as_millis() as u64, "Poll loop did not stop in time; aborting");
                    handle.abort();
                    return Err(SchedulerError::Timeout { seconds: grace.as_secs() });
                }
            }
        }

        info!("Poll scheduler stopped");
        Ok(())
    }

    /// Check if scheduler is running
    ///
    /// A scheduler is considered running if it has an active task handle that
    /// hasn't finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    /// Background poll loop
    async fn poll_loop(
        context: PollLoopContext,
        config: PollSchedulerConfig,
        cancel: CancellationToken,
    ) {
        let PollLoopContext { poller, clock, metrics } = context;
        let mut cursor = Cursor::start();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let started = Instant::now();
            let outcome =
                tokio::time::timeout(config.cycle_timeout, poller.run_cycle(&cursor, &cancel)).await;
            let elapsed = started.elapsed();

            let delay = match outcome {
                Ok(Ok(report)) => {
                    log_metric(metrics.record_cycle(&report.stats, elapsed), "poller.cycle");
                    log_metric(metrics.record_success(clock.now()), "poller.success");
                    log_report(&report, elapsed, poller.store().size());
                    cursor = report.cursor;
                    next_delay(&config, report.rate_limit.as_ref(), clock.now())
                }
                Ok(Err(failure)) => {
                    log_metric(metrics.record_cycle(&failure.stats, elapsed), "poller.cycle");
                    log_metric(metrics.record_failure(&failure.source), "poller.failure");
                    warn!(
                        error = %failure.source,
                        kind = failure.source.label(),
                        pages = failure.stats.pages,
                        inserted = failure.stats.inserted,
                        "Poll cycle failed; keeping cursor"
                    );
                    failure_delay(&config, &failure.source, clock.now())
                }
                Err(_) => {
                    let error = FetchError::Timeout(config.cycle_timeout);
                    log_metric(metrics.record_failure(&error), "poller.timeout");
                    warn!(timeout_secs = config.cycle_timeout.as_secs(), "Poll cycle timed out; keeping cursor");
                    config.interval
                }
            };

            debug!(delay_ms = delay.as_millis() as u64, "Next poll scheduled");
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Poll loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn log_report(report: &CycleReport, elapsed: Duration, store_size: usize) {
    info!(
        pages = report.stats.pages,
        fetched = report.stats.fetched,
        inserted = report.stats.inserted,
        duplicates = report.stats.duplicates,
        unsupported = report.stats.unsupported,
        malformed = report.stats.malformed,
        evicted = report.stats.evicted,
        stop_reason = ?report.stop_reason,
        store_size,
        elapsed_ms = elapsed.as_millis() as u64,
        "Poll cycle completed"
    );
}

/// Wait after a successful cycle.
fn next_delay(
    config: &PollSchedulerConfig,
    rate_limit: Option<&RateLimitInfo>,
    now: DateTime<Utc>,
) -> Duration {
    let mut delay = config.interval;
    let Some(info) = rate_limit else {
        return delay;
    };

    if let Some(requested) = info.poll_interval {
        delay = delay.max(requested);
    }
    if info.is_exhausted() {
        delay = delay.max(until_reset(config, info.reset_at, now));
    }
    delay
}

/// Wait after a failed cycle.
fn failure_delay(config: &PollSchedulerConfig, error: &FetchError, now: DateTime<Utc>) -> Duration {
    match error {
        FetchError::RateLimited { reset_at } => {
            config.interval.max(until_reset(config, *reset_at, now))
        }
        _ => config.interval,
    }
}

fn until_reset(
    config: &PollSchedulerConfig,
    reset_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Duration {
    let wait = match reset_at {
        Some(reset_at) => (reset_at - now).to_std().unwrap_or_default(),
        None => config.max_backoff,
    };
    wait.min(config.max_backoff)
}

fn log_metric(result: MetricsResult<()>, metric: &'static str) {
    if let Err(err) = result {
        warn!(metric = metric, error = ?err, "Failed to record scheduler metric");
    }
}

/// Ensure scheduler is stopped when dropped
impl Drop for PollScheduler {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() {
            warn!("PollScheduler dropped while running; cancelling");
            self.cancellation_token.cancel();
        }
    }
}
