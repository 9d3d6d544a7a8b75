//! API token resolution.
//!
//! A token may be given directly, through a file (the Docker secrets
//! pattern, e.g. `/run/secrets/crowdin_token`) or through an environment
//! variable. The first configured source wins.

use std::fs;

use secrecy::SecretString;

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source configured (need a value, a file path or an env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret file '{path}' is empty")]
    EmptyFile { path: String },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Where a secret may come from, in priority order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource<'a> {
    pub value: Option<&'a str>,
    pub file: Option<&'a str>,
    pub env_var: Option<&'a str>,
}

impl<'a> SecretSource<'a> {
    pub fn is_configured(&self) -> bool {
        [self.value, self.file, self.env_var]
            .iter()
            .any(|s| s.is_some_and(|s| !s.is_empty()))
    }
}

/// Resolves a secret from the first non-empty source. File and env var
/// contents are trimmed.
pub fn resolve_secret(source: &SecretSource<'_>) -> Result<SecretString, SecretError> {
    if let Some(value) = source.value.filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = source.file.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileRead {
            path: expanded.clone(),
            source: e,
        })?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(SecretError::EmptyFile { path: expanded });
        }
        return Ok(SecretString::from(trimmed.to_string()));
    }

    if let Some(name) = source.env_var.filter(|n| !n.is_empty()) {
        return match std::env::var(name) {
            Ok(value) => Ok(SecretString::from(value.trim().to_string())),
            Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                name: name.to_string(),
            }),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                name: name.to_string(),
            }),
        };
    }

    Err(SecretError::NoSourceProvided)
}

/// Like [`resolve_secret`], but a missing source or an unset env var is not
/// an error.
pub fn resolve_secret_optional(
    source: &SecretSource<'_>,
) -> Result<Option<SecretString>, SecretError> {
    match resolve_secret(source) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Resolves the platform API token from the token file or the token env var.
pub fn resolve_api_token(config: &AppConfig) -> Result<Option<SecretString>, SecretError> {
    let source = SecretSource {
        value: None,
        file: config.api_token_file.as_deref(),
        env_var: Some(config.api_token_env.as_str()),
    };
    if !source.is_configured() {
        log::warn!("No API token source configured; remote requests will be unauthenticated");
        return Ok(None);
    }

    let token = resolve_secret_optional(&source)?;
    match (&token, source.file) {
        (Some(_), Some(path)) => log::debug!("API token read from {}", path),
        (Some(_), None) => log::debug!("API token read from ${}", config.api_token_env),
        (None, _) => log::warn!(
            "No API token found in ${}; remote requests will be unauthenticated",
            config.api_token_env
        ),
    }
    Ok(token)
}

/// Expands a leading `~` to the user's home directory. `~user` is not
/// supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE")) {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source<'a>(
        value: Option<&'a str>,
        file: Option<&'a str>,
        env_var: Option<&'a str>,
    ) -> SecretSource<'a> {
        SecretSource {
            value,
            file,
            env_var,
        }
    }

    // Tests that modify environment variables must run serially
    #[test]
    #[serial]
    fn test_value_takes_priority() {
        std::env::set_var("SRXSYNC_TEST_TOKEN_1", "env_value");
        let result =
            resolve_secret(&source(Some("direct"), None, Some("SRXSYNC_TEST_TOKEN_1"))).unwrap();
        assert_eq!(result.expose_secret(), "direct");
        std::env::remove_var("SRXSYNC_TEST_TOKEN_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  file_token  ").unwrap();

        std::env::set_var("SRXSYNC_TEST_TOKEN_2", "env_value");
        let path = file.path().to_str().unwrap();
        let result = resolve_secret(&source(None, Some(path), Some("SRXSYNC_TEST_TOKEN_2"))).unwrap();
        assert_eq!(result.expose_secret(), "file_token");
        std::env::remove_var("SRXSYNC_TEST_TOKEN_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback_and_empty_strings_ignored() {
        std::env::set_var("SRXSYNC_TEST_TOKEN_3", "env_value\n");
        let result =
            resolve_secret(&source(Some(""), Some(""), Some("SRXSYNC_TEST_TOKEN_3"))).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("SRXSYNC_TEST_TOKEN_3");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            resolve_secret(&SecretSource::default()),
            Err(SecretError::NoSourceProvided)
        ));
        assert!(matches!(
            resolve_secret(&source(None, Some("/nonexistent/token"), None)),
            Err(SecretError::FileRead { .. })
        ));
        assert!(matches!(
            resolve_secret(&source(None, None, Some("SRXSYNC_DEFINITELY_NOT_SET"))),
            Err(SecretError::EnvVarNotSet { .. })
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        assert!(matches!(
            resolve_secret(&source(None, Some(path), None)),
            Err(SecretError::EmptyFile { .. })
        ));
    }

    #[test]
    fn test_is_configured() {
        assert!(source(Some("v"), None, None).is_configured());
        assert!(source(None, None, Some("ENV")).is_configured());
        assert!(!source(Some(""), Some(""), Some("")).is_configured());
    }

    #[test]
    #[serial]
    fn test_api_token_optional() {
        std::env::remove_var("SRXSYNC_TEST_API_TOKEN");
        let mut config = AppConfig {
            api_token_env: "SRXSYNC_TEST_API_TOKEN".into(),
            ..AppConfig::default()
        };
        assert!(resolve_api_token(&config).unwrap().is_none());

        std::env::set_var("SRXSYNC_TEST_API_TOKEN", "abc");
        assert_eq!(
            resolve_api_token(&config).unwrap().unwrap().expose_secret(),
            "abc"
        );
        std::env::remove_var("SRXSYNC_TEST_API_TOKEN");

        config.api_token_file = Some("/nonexistent/token".into());
        assert!(resolve_api_token(&config).is_err());
    }

    #[test]
    fn test_api_token_without_any_source() {
        let config = AppConfig {
            api_token_env: String::new(),
            api_token_file: Some(String::new()),
            ..AppConfig::default()
        };
        assert!(resolve_api_token(&config).unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_expand_home() {
        assert_eq!(expand_home("/run/secrets/token"), "/run/secrets/token");
        if let Ok(home) = std::env::var("HOME") {
            assert_eq!(expand_home("~/token"), format!("{}/token", home));
            assert_eq!(expand_home("~"), home);
        }
    }
}
