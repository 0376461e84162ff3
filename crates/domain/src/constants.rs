//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Poller defaults
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_MAX_PAGES_PER_CYCLE: u32 = 3;
pub const DEFAULT_CYCLE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 900;

// Retention defaults
pub const DEFAULT_RETENTION_MINUTES: u64 = 120;
pub const DEFAULT_MAX_EVENTS: usize = 50_000;
pub const MAX_RETENTION_MINUTES: u64 = 525_600;

// Source defaults (GitHub caps per_page at 100)
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str = concat!("repopulse/", env!("CARGO_PKG_VERSION"));

// Query defaults
pub const DEFAULT_OFFSET_MINUTES: i64 = 10;
pub const DEFAULT_TOP_N: i64 = 5;
pub const DEBUG_SAMPLE_SIZE: usize = 5;

// Server defaults
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";
