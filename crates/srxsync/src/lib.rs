//! Keeps the XML parser settings of translation platform files in line with
//! a segmentation rules (SRX) document.

pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod reconcile;
pub mod remote;
pub mod rules;
pub mod secrets;
pub mod status;

pub use config::{load_config, load_from_env, AppConfig, LogFormat};
pub use error::{ConfigError, Result, RulesError, SrxSyncError};
pub use parser::{derive, ExpectedConfiguration};
pub use reconcile::{
    DivergenceReport, DivergentFile, FileOutcome, MonitoringService, PassTrigger, ProjectStatus,
    ReconciliationResult, Reconciler, SyncScheduler,
};
pub use remote::{
    HttpInventory, InMemoryInventory, ParserOptions, RemoteError, RemoteFile, RemoteInventory,
    RemoteProject,
};
pub use rules::{validate, RulesDocument, RulesProvider};
pub use secrets::{
    resolve_api_token, resolve_secret, resolve_secret_optional, SecretError, SecretSource,
};
pub use status::{MonitoringStats, PassRecord, StatusAggregator};
