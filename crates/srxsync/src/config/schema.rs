use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    #[serde(default = "default_rules_file")]
    pub rules_file: String,
    #[serde(default)]
    pub cache_rules: bool,
    #[serde(default = "default_group_label")]
    pub project_group_label: String,
    #[serde(default)]
    pub project_group_id: String,
    /// Empty means every project of the group.
    #[serde(default)]
    pub allowed_project_ids: Vec<u64>,
    #[serde(default = "default_true")]
    pub enable_auto_configuration: bool,
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
    #[serde(default = "default_file_concurrency")]
    pub file_concurrency: usize,
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub enterprise_api_url: Option<String>,
    #[serde(default)]
    pub api_token_file: Option<String>,
    #[serde(default = "default_token_env")]
    pub api_token_env: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_port() -> u16 {
    3000
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_rules_file() -> String {
    "rules.srx".to_string()
}

fn default_group_label() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_check_interval() -> u64 {
    300
}

fn default_file_concurrency() -> usize {
    1
}

fn default_history_capacity() -> usize {
    50
}

fn default_api_url() -> String {
    "https://api.crowdin.com/api/v2".to_string()
}

fn default_token_env() -> String {
    "CROWDIN_API_TOKEN".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            working_dir: default_working_dir(),
            rules_file: default_rules_file(),
            cache_rules: false,
            project_group_label: default_group_label(),
            project_group_id: String::new(),
            allowed_project_ids: Vec::new(),
            enable_auto_configuration: true,
            check_interval_secs: default_check_interval(),
            file_concurrency: default_file_concurrency(),
            history_capacity: default_history_capacity(),
            api_url: default_api_url(),
            enterprise_api_url: None,
            api_token_file: None,
            api_token_env: default_token_env(),
            request_timeout_secs: default_request_timeout(),
            max_redirects: default_max_redirects(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_group_id.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "project_group_id (TARGET_PROJECT_GROUP_ID) is required".to_string(),
            });
        }
        if self.rules_file.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "rules_file must not be empty".to_string(),
            });
        }

        let positive = [
            ("check_interval_secs", self.check_interval_secs),
            ("file_concurrency", self.file_concurrency as u64),
            ("request_timeout_secs", self.request_timeout_secs),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT".to_string(),
                reason: format!("expected 'text' or 'json', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            project_group_id: "24".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rules_file, "rules.srx");
        assert_eq!(config.check_interval_secs, 300);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.max_redirects, 5);
        assert!(config.enable_auto_configuration);
        assert!(!config.cache_rules);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_group_id_is_required() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = AppConfig {
            file_concurrency: 0,
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name, .. }) if name == "file_concurrency"
        ));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
