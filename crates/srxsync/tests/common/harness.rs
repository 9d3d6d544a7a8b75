//! Test harness for isolated reconciliation runs.
//!
//! Each harness owns a temporary working directory holding the rules file,
//! an in-memory inventory and the services built on top of them.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use srxsync::{
    InMemoryInventory, MonitoringService, Reconciler, RulesProvider, StatusAggregator,
};

use super::builders::{FileBuilder, OptionsBuilder, ProjectBuilder, GROUP_ID, RULES};

pub struct TestHarness {
    temp_dir: TempDir,
    pub rules_path: PathBuf,
    pub inventory: Arc<InMemoryInventory>,
    pub reconciler: Arc<Reconciler>,
    pub status: Arc<StatusAggregator>,
    pub monitoring: Arc<MonitoringService>,
}

impl TestHarness {
    /// Harness with the default rules file written.
    pub fn new() -> Self {
        let harness = Self::without_rules();
        harness.write_rules(RULES);
        harness
    }

    /// Harness whose rules file does not exist yet.
    pub fn without_rules() -> Self {
        Self::build(1, Vec::new())
    }

    pub fn with_file_concurrency(concurrency: usize) -> Self {
        let harness = Self::build(concurrency, Vec::new());
        harness.write_rules(RULES);
        harness
    }

    pub fn with_allowed_projects(project_ids: Vec<u64>) -> Self {
        let harness = Self::build(1, project_ids);
        harness.write_rules(RULES);
        harness
    }

    fn build(concurrency: usize, allowed: Vec<u64>) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let rules_path = temp_dir.path().join("rules.srx");
        let inventory = Arc::new(InMemoryInventory::new());
        let provider = Arc::new(RulesProvider::new(temp_dir.path(), "rules.srx"));
        let reconciler = Arc::new(
            Reconciler::new(inventory.clone(), provider)
                .with_file_concurrency(concurrency)
                .with_allowed_projects(allowed),
        );
        let status = Arc::new(StatusAggregator::new(
            GROUP_ID.to_string(),
            "Help Center",
            "rules.srx",
        ));
        let monitoring = Arc::new(MonitoringService::new(
            reconciler.clone(),
            status.clone(),
            GROUP_ID.to_string(),
        ));

        Self {
            temp_dir,
            rules_path,
            inventory,
            reconciler,
            status,
            monitoring,
        }
    }

    pub fn group_id(&self) -> String {
        GROUP_ID.to_string()
    }

    pub fn write_rules(&self, content: &str) {
        std::fs::write(&self.rules_path, content).expect("Failed to write rules file");
    }

    pub fn remove_rules(&self) {
        std::fs::remove_file(&self.rules_path).expect("Failed to remove rules file");
    }

    /// Adds a project with unconfigured XML files named `names`. File ids are
    /// `project_id * 100 + index`.
    pub fn add_project_with_files(&self, project_id: u64, names: &[&str]) {
        self.inventory
            .add_project(ProjectBuilder::new(project_id).build());
        for (i, name) in names.iter().enumerate() {
            self.inventory
                .add_file(FileBuilder::new(file_id(project_id, i), project_id, name).build());
        }
    }

    /// Adds a file already carrying the compliant options for the default rules.
    pub fn add_configured_file(&self, id: u64, project_id: u64, name: &str) {
        self.inventory.add_file(
            FileBuilder::new(id, project_id, name)
                .options(OptionsBuilder::compliant(RULES).build())
                .build(),
        );
    }
}

pub fn file_id(project_id: u64, index: usize) -> u64 {
    project_id * 100 + index as u64
}
