//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use repopulse_infra::config;
use tempfile::NamedTempFile;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "poller": {
            "interval_seconds": 15,
            "max_pages_per_cycle": 2
        },
        "retention": {
            "horizon_minutes": 60,
            "max_events": null
        },
        "server": {
            "bind_address": "0.0.0.0:5000"
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("config should load");

    assert_eq!(config.poller.interval_seconds, 15);
    assert_eq!(config.poller.max_pages_per_cycle, 2);
    assert_eq!(config.retention.horizon_minutes, 60);
    assert_eq!(config.retention.max_events, None);
    assert_eq!(config.server.bind_address, "0.0.0.0:5000");
    assert!(config.validate().is_ok());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_file_config_failing_validation_is_reported() {
    let toml_content = r#"
[source]
per_page = 500
"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("toml");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("file should parse");
    assert!(config.validate().is_err(), "per_page above 100 must be rejected");

    std::fs::remove_file(path).ok();
}
