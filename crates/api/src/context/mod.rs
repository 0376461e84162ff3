//! Application context - dependency injection container

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use repopulse_core::{
    Clock, EventSource, Poller, PollerSettings, QueryService, RetentionPolicy, RetentionStore,
    SystemClock,
};
use repopulse_domain::{Config, Result};
use repopulse_infra::{
    GitHubEventSource, PollScheduler, PollSchedulerConfig, PollerMetrics, SchedulerError,
};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub clock: Arc<dyn Clock>,
    pub store: Arc<RetentionStore>,
    pub query: QueryService,
    pub metrics: Arc<PollerMetrics>,
    scheduler: Mutex<PollScheduler>,
}

impl AppContext {
    /// Wire the service against GitHub using the system clock.
    ///
    /// The poll scheduler is constructed but not started; call
    /// [`AppContext::start`].
    pub fn new(config: Config) -> Result<Self> {
        let source = GitHubEventSource::from_config(&config.source)?;
        Ok(Self::with_source(config, Arc::new(source), Arc::new(SystemClock)))
    }

    /// Wire the service against an arbitrary event source and clock.
    pub fn with_source(config: Config, source: Arc<dyn EventSource>, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(RetentionStore::new(RetentionPolicy::from(&config.retention)));
        let poller = Arc::new(Poller::new(
            source,
            store.clone(),
            clock.clone(),
            PollerSettings::from(&config.poller),
        ));
        let metrics = Arc::new(PollerMetrics::new());
        let scheduler = PollScheduler::new(
            poller,
            clock.clone(),
            PollSchedulerConfig::from(&config.poller),
            metrics.clone(),
        );
        let query = QueryService::new(store.clone(), clock.clone());

        Self { config, clock, store, query, metrics, scheduler: Mutex::new(scheduler) }
    }

    /// Start background polling.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        self.scheduler.lock().await.start().await?;
        info!(
            bind = %self.config.server.bind_address,
            horizon_minutes = self.config.retention.horizon_minutes,
            "polling started"
        );
        Ok(())
    }

    /// Stop background polling, waiting up to the configured grace period.
    ///
    /// Stopping a context that was never started is not an error.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<()> {
        match self.scheduler.lock().await.stop().await {
            Ok(()) | Err(SchedulerError::NotRunning) => {}
            Err(err) => {
                warn!(error = %err, "poll scheduler did not stop cleanly");
                return Err(err.into());
            }
        }
        info!(retained = self.store.size(), "shutdown complete");
        Ok(())
    }

    pub async fn is_polling(&self) -> bool {
        self.scheduler.lock().await.is_running()
    }

    /// Comprehensive health check of the running service.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new(self.clock.now())
            .add_component(self.check_scheduler_health())
            .add_component(self.check_source_health())
            .add_component(ComponentHealth::healthy("store"));

        status.calculate_score();
        status
    }

    /// Never waits on the scheduler lock; `start` and `shutdown` hold it
    /// for as long as the transition takes.
    fn check_scheduler_health(&self) -> ComponentHealth {
        match self.scheduler.try_lock() {
            Ok(scheduler) if scheduler.is_running() => ComponentHealth::healthy("scheduler"),
            Ok(_) => ComponentHealth::unhealthy("scheduler", "poll scheduler is not running"),
            Err(_) => {
                ComponentHealth::unhealthy("scheduler", "poll scheduler is starting or stopping")
            }
        }
    }

    /// The source is stale once no cycle has succeeded for three intervals
    /// plus one cycle timeout.
    fn check_source_health(&self) -> ComponentHealth {
        let snapshot = self.metrics.snapshot();
        let Some(last_success) = snapshot.last_success else {
            return if snapshot.cycles == 0 {
                ComponentHealth::healthy_with("source", "awaiting first cycle")
            } else {
                ComponentHealth::unhealthy("source", "no successful poll cycle yet")
            };
        };

        let poller = &self.config.poller;
        let allowance = poller.interval() * 3 + poller.cycle_timeout();
        let allowance = ChronoDuration::from_std(allowance).unwrap_or(ChronoDuration::MAX);
        let age = self.clock.now() - last_success;

        if age > allowance {
            ComponentHealth::unhealthy(
                "source",
                format!("last successful cycle {}s ago", age.num_seconds()),
            )
        } else {
            ComponentHealth::healthy("source")
        }
    }
}
