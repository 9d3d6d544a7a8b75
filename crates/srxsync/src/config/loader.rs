use std::path::Path;
use std::str::FromStr;

use crate::config::schema::{AppConfig, LogFormat};
use crate::error::ConfigError;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "SRXSYNC_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let config = read_config_file(path.as_ref())?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_from_str(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration from the process environment.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    load_with(|name| std::env::var(name).ok())
}

/// Loads the JSON file named by `SRXSYNC_CONFIG` (if any), overlays the
/// variables returned by `lookup`, then validates the result.
pub fn load_with<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match non_empty(&lookup, CONFIG_PATH_ENV) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => AppConfig::default(),
    };

    apply_overrides(&mut config, &lookup)?;
    config.validate()?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn apply_overrides<F>(config: &mut AppConfig, lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = non_empty(lookup, "PORT") {
        config.port = parse_value("PORT", &v)?;
    }
    if let Some(v) = non_empty(lookup, "SRX_WORKING_DIR") {
        config.working_dir = v;
    }
    if let Some(v) = non_empty(lookup, "SRX_RULES_FILE") {
        config.rules_file = v;
    }
    if let Some(v) = non_empty(lookup, "CACHE_RULES") {
        config.cache_rules = parse_bool("CACHE_RULES", &v)?;
    }
    if let Some(v) = non_empty(lookup, "TARGET_PROJECT_GROUP") {
        config.project_group_label = v;
    }
    if let Some(v) = non_empty(lookup, "TARGET_PROJECT_GROUP_ID") {
        config.project_group_id = v;
    }
    if let Some(v) = lookup("ALLOWED_PROJECT_IDS") {
        config.allowed_project_ids = parse_id_list("ALLOWED_PROJECT_IDS", &v)?;
    }
    if let Some(v) = non_empty(lookup, "ENABLE_AUTO_CONFIG") {
        config.enable_auto_configuration = parse_bool("ENABLE_AUTO_CONFIG", &v)?;
    }
    if let Some(v) = non_empty(lookup, "CHECK_INTERVAL_SECS") {
        config.check_interval_secs = parse_value("CHECK_INTERVAL_SECS", &v)?;
    }
    if let Some(v) = non_empty(lookup, "FILE_CONCURRENCY") {
        config.file_concurrency = parse_value("FILE_CONCURRENCY", &v)?;
    }
    if let Some(v) = non_empty(lookup, "HISTORY_CAPACITY") {
        config.history_capacity = parse_value("HISTORY_CAPACITY", &v)?;
    }
    if let Some(v) = non_empty(lookup, "CROWDIN_API_URL") {
        config.api_url = v;
    }
    if let Some(v) = non_empty(lookup, "CROWDIN_ENTERPRISE_API_URL") {
        config.enterprise_api_url = Some(v);
    }
    if let Some(v) = non_empty(lookup, "CROWDIN_API_TOKEN_FILE") {
        config.api_token_file = Some(v);
    }
    if let Some(v) = non_empty(lookup, "REQUEST_TIMEOUT_SECS") {
        config.request_timeout_secs = parse_value("REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = non_empty(lookup, "MAX_REDIRECTS") {
        config.max_redirects = parse_value("MAX_REDIRECTS", &v)?;
    }
    if let Some(v) = non_empty(lookup, "LOG_FORMAT") {
        config.log_format = LogFormat::from_str(&v)?;
    }
    Ok(())
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(name: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| invalid(name, format!("'{}': {}", value, e)))
}

fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(invalid(name, format!("'{}' is not a boolean", other))),
    }
}

fn parse_id_list(name: &str, value: &str) -> Result<Vec<u64>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_value(name, s))
        .collect()
}
