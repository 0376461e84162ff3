//! Configuration loader
//!
//! Builds the application [`Config`] from defaults, an optional config file
//! and environment overrides.
//!
//! ## Loading Strategy
//! 1. Start from a config file if one is found, otherwise from defaults
//! 2. Apply environment variable overrides on top
//! 3. Validate the result
//!
//! ## Environment Variables
//! - `REPOPULSE_POLL_INTERVAL`: Seconds between poll cycles
//! - `REPOPULSE_MAX_PAGES`: Pages fetched per cycle at most
//! - `REPOPULSE_CYCLE_TIMEOUT`: Seconds before a cycle is abandoned
//! - `REPOPULSE_SHUTDOWN_GRACE`: Seconds to wait for the poller on shutdown
//! - `REPOPULSE_RETENTION_MINUTES`: Retention horizon in minutes
//! - `REPOPULSE_MAX_EVENTS`: Hard cap on retained events (`0`/`none` disables)
//! - `REPOPULSE_GITHUB_URL`: Base URL of the events API
//! - `GITHUB_TOKEN`: Optional API token
//! - `REPOPULSE_PER_PAGE`: Events requested per page
//! - `REPOPULSE_BIND`: Query server bind address
//! - `REPOPULSE_LOG_LEVEL`: Default log level
//! - `REPOPULSE_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./repopulse.toml` or `./repopulse.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use repopulse_domain::{Config, RepoPulseError, Result};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["repopulse.toml", "repopulse.json", "config.toml", "config.json"];

/// Load, override and validate configuration.
///
/// A missing config file is not an error; defaults are used instead.
///
/// # Errors
/// Returns `RepoPulseError::Config` if a file exists but cannot be parsed,
/// an environment override is malformed, or validation fails.
pub fn load() -> Result<Config> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("No config file found, starting from defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    tracing::info!(
        interval_secs = config.poller.interval_seconds,
        max_pages = config.poller.max_pages_per_cycle,
        horizon_minutes = config.retention.horizon_minutes,
        authenticated = config.source.token.is_some(),
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RepoPulseError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RepoPulseError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            RepoPulseError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RepoPulseError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`). Sections and
/// fields left out fall back to their defaults.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RepoPulseError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RepoPulseError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(RepoPulseError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe the standard paths for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Apply `REPOPULSE_*` and `GITHUB_TOKEN` overrides to `config`.
///
/// Unset or empty variables leave the current value untouched.
///
/// # Errors
/// Returns `RepoPulseError::Config` if a numeric variable does not parse.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(value) = env_parse("REPOPULSE_POLL_INTERVAL")? {
        config.poller.interval_seconds = value;
    }
    if let Some(value) = env_parse("REPOPULSE_MAX_PAGES")? {
        config.poller.max_pages_per_cycle = value;
    }
    if let Some(value) = env_parse("REPOPULSE_CYCLE_TIMEOUT")? {
        config.poller.cycle_timeout_seconds = value;
    }
    if let Some(value) = env_parse("REPOPULSE_SHUTDOWN_GRACE")? {
        config.poller.shutdown_grace_seconds = value;
    }
    if let Some(value) = env_parse("REPOPULSE_RETENTION_MINUTES")? {
        config.retention.horizon_minutes = value;
    }
    if let Some(raw) = env_var("REPOPULSE_MAX_EVENTS") {
        config.retention.max_events = match raw.to_ascii_lowercase().as_str() {
            "0" | "none" | "off" => None,
            _ => Some(parse_value("REPOPULSE_MAX_EVENTS", &raw)?),
        };
    }
    if let Some(value) = env_var("REPOPULSE_GITHUB_URL") {
        config.source.base_url = value;
    }
    if let Some(token) = env_var("GITHUB_TOKEN") {
        config.source.token = Some(token);
    }
    if let Some(value) = env_parse("REPOPULSE_PER_PAGE")? {
        config.source.per_page = value;
    }
    if let Some(value) = env_var("REPOPULSE_BIND") {
        config.server.bind_address = value;
    }
    if let Some(value) = env_var("REPOPULSE_LOG_LEVEL") {
        config.logging.level = value;
    }
    config.logging.json = env_bool("REPOPULSE_LOG_JSON", config.logging.json);

    Ok(())
}

/// Read an environment variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key).map(|raw| parse_value(key, &raw)).transpose()
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| RepoPulseError::Config(format!("Invalid value for {}: {}", key, e)))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
///
/// # Returns
/// The parsed boolean value, or `default` if not set.
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const OVERRIDE_VARS: [&str; 12] = [
        "REPOPULSE_POLL_INTERVAL",
        "REPOPULSE_MAX_PAGES",
        "REPOPULSE_CYCLE_TIMEOUT",
        "REPOPULSE_SHUTDOWN_GRACE",
        "REPOPULSE_RETENTION_MINUTES",
        "REPOPULSE_MAX_EVENTS",
        "REPOPULSE_GITHUB_URL",
        "GITHUB_TOKEN",
        "REPOPULSE_PER_PAGE",
        "REPOPULSE_BIND",
        "REPOPULSE_LOG_LEVEL",
        "REPOPULSE_LOG_JSON",
    ];

    fn clear_overrides() {
        for key in OVERRIDE_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("TEST_BOOL_TRUE_YES", "yes");
        std::env::set_var("TEST_BOOL_TRUE_UPPER", "TRUE");
        std::env::set_var("TEST_BOOL_FALSE_OFF", "off");
        std::env::remove_var("TEST_BOOL_MISSING");

        assert!(env_bool("TEST_BOOL_TRUE_YES", false));
        assert!(env_bool("TEST_BOOL_TRUE_UPPER", false));
        assert!(!env_bool("TEST_BOOL_FALSE_OFF", true));
        assert!(env_bool("TEST_BOOL_MISSING", true));
        assert!(!env_bool("TEST_BOOL_MISSING", false));

        std::env::remove_var("TEST_BOOL_TRUE_YES");
        std::env::remove_var("TEST_BOOL_TRUE_UPPER");
        std::env::remove_var("TEST_BOOL_FALSE_OFF");
    }

    #[test]
    fn test_env_overrides_applied() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("REPOPULSE_POLL_INTERVAL", "45");
        std::env::set_var("REPOPULSE_RETENTION_MINUTES", "30");
        std::env::set_var("REPOPULSE_MAX_EVENTS", "none");
        std::env::set_var("GITHUB_TOKEN", "ghp_test");
        std::env::set_var("REPOPULSE_BIND", "0.0.0.0:8080");
        std::env::set_var("REPOPULSE_LOG_JSON", "true");

        let mut config = Config::default();
        apply_env_overrides(&mut config).unwrap();

        assert_eq!(config.poller.interval_seconds, 45);
        assert_eq!(config.retention.horizon_minutes, 30);
        assert_eq!(config.retention.max_events, None);
        assert_eq!(config.source.token.as_deref(), Some("ghp_test"));
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert!(config.logging.json);
        // Untouched fields keep their defaults.
        assert_eq!(config.poller.max_pages_per_cycle, 3);

        clear_overrides();
    }

    #[test]
    fn test_env_override_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("REPOPULSE_MAX_PAGES", "lots");

        let mut config = Config::default();
        let err = apply_env_overrides(&mut config).unwrap_err();
        assert!(matches!(err, RepoPulseError::Config(ref msg) if msg.contains("REPOPULSE_MAX_PAGES")));

        clear_overrides();
    }

    #[test]
    fn test_empty_env_value_is_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("GITHUB_TOKEN", "  ");

        let mut config = Config::default();
        apply_env_overrides(&mut config).unwrap();
        assert_eq!(config.source.token, None);

        clear_overrides();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = temp_config(
            r#"{
                "poller": { "interval_seconds": 20 },
                "retention": { "horizon_minutes": 15, "max_events": 100 }
            }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.poller.interval_seconds, 20);
        assert_eq!(config.retention.horizon_minutes, 15);
        assert_eq!(config.retention.max_events, Some(100));
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = temp_config(
            r#"
[poller]
max_pages_per_cycle = 5

[source]
base_url = "http://localhost:9000"
per_page = 50

[logging]
level = "debug"
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).unwrap();
        assert_eq!(config.poller.max_pages_per_cycle, 5);
        assert_eq!(config.source.base_url, "http://localhost:9000");
        assert_eq!(config.source.per_page, 50);
        assert_eq!(config.logging.level, "debug");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/repopulse.toml")));
        assert!(matches!(result, Err(RepoPulseError::Config(_))));
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let path = temp_config(r#"{ "poller": "#, "json");
        assert!(load_from_file(Some(path.clone())).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("some content", &PathBuf::from("test.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }

    #[test]
    fn test_load_rejects_invalid_override() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_overrides();

        std::env::set_var("REPOPULSE_POLL_INTERVAL", "0");
        let result = load();
        assert!(matches!(result, Err(RepoPulseError::Config(_))));

        clear_overrides();
    }
}
