//! Shared application state.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use srxsync::{
    resolve_api_token, AppConfig, HttpInventory, MonitoringService, Reconciler, RemoteInventory,
    RulesProvider, StatusAggregator,
};
use tokio::sync::broadcast;

pub struct AppState {
    pub config: AppConfig,
    pub rules: Arc<RulesProvider>,
    pub reconciler: Arc<Reconciler>,
    pub status: Arc<StatusAggregator>,
    pub monitoring: Arc<MonitoringService>,
    /// Manual trigger channel consumed by the scheduler.
    pub trigger_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Wires the services around the given inventory.
    pub fn new(config: AppConfig, inventory: Arc<dyn RemoteInventory>) -> Self {
        let rules = Arc::new(
            RulesProvider::new(Path::new(&config.working_dir), &config.rules_file)
                .with_cache(config.cache_rules),
        );
        let reconciler = Arc::new(
            Reconciler::new(inventory, Arc::clone(&rules))
                .with_allowed_projects(config.allowed_project_ids.clone())
                .with_file_concurrency(config.file_concurrency),
        );
        let status = Arc::new(StatusAggregator::from_config(&config));
        let monitoring = Arc::new(MonitoringService::new(
            Arc::clone(&reconciler),
            Arc::clone(&status),
            config.project_group_id.clone(),
        ));
        let (trigger_tx, _) = broadcast::channel(16);

        Self {
            config,
            rules,
            reconciler,
            status,
            monitoring,
            trigger_tx,
        }
    }

    /// Builds the state against the live platform API.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let token = resolve_api_token(&config).context("Failed to resolve API token")?;
        let inventory = HttpInventory::from_config(&config, token)
            .context("Failed to create platform client")?;
        Ok(Self::new(config, Arc::new(inventory)))
    }

    pub fn group_id(&self) -> &str {
        &self.config.project_group_id
    }
}
