//! Configuration loading from JSON files and the environment.

use serial_test::serial;
use srxsync::config::{load_config, load_from_env, CONFIG_PATH_ENV};
use srxsync::{ConfigError, LogFormat};
use tempfile::TempDir;

const VARS: &[&str] = &[
    CONFIG_PATH_ENV,
    "TARGET_PROJECT_GROUP_ID",
    "SRX_RULES_FILE",
    "LOG_FORMAT",
    "FILE_CONCURRENCY",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn test_load_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("srxsync.json");
    std::fs::write(
        &path,
        r#"{
            "project_group_id": "24",
            "project_group_label": "Help Center",
            "working_dir": "/srv/srx",
            "cache_rules": true,
            "request_timeout_secs": 30
        }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.project_group_label, "Help Center");
    assert_eq!(config.working_dir, "/srv/srx");
    assert!(config.cache_rules);
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.max_redirects, 5);
}

#[test]
fn test_load_config_missing_file() {
    let result = load_config("/nonexistent/srxsync.json");
    assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
}

#[test]
#[serial]
fn test_load_from_env() {
    clear_env();
    std::env::set_var("TARGET_PROJECT_GROUP_ID", "42");
    std::env::set_var("SRX_RULES_FILE", "custom.srx");
    std::env::set_var("LOG_FORMAT", "json");

    let config = load_from_env().unwrap();
    assert_eq!(config.project_group_id, "42");
    assert_eq!(config.rules_file, "custom.srx");
    assert_eq!(config.log_format, LogFormat::Json);

    clear_env();
}

#[test]
#[serial]
fn test_load_from_env_requires_group() {
    clear_env();
    assert!(matches!(
        load_from_env(),
        Err(ConfigError::Validation { .. })
    ));
}

#[test]
#[serial]
fn test_zero_concurrency_rejected() {
    clear_env();
    std::env::set_var("TARGET_PROJECT_GROUP_ID", "42");
    std::env::set_var("FILE_CONCURRENCY", "0");

    assert!(matches!(
        load_from_env(),
        Err(ConfigError::InvalidValue { .. })
    ));

    clear_env();
}
