use std::path::PathBuf;
use thiserror::Error;

use crate::remote::RemoteError;
use crate::secrets::SecretError;

#[derive(Error, Debug)]
pub enum SrxSyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("Remote platform error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),
}

/// Errors raised while loading or validating the segmentation rules document.
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Rules file not found: '{path}'")]
    NotFound { path: PathBuf },

    #[error("Failed to read rules file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rules file '{path}' failed validation (expected <srx>, <body> and at least one <rule>)")]
    Invalid { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SrxSyncError>;
