use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::remote::{FileId, ProjectId};

/// What happened to a single file during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "lowercase")]
pub enum FileOutcome {
    /// Already compliant, nothing was written.
    Skipped,
    /// The expected configuration was written.
    Applied,
    Failed(String),
}

/// What started a monitoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassTrigger {
    Scheduled,
    Manual,
}

/// Outcome of a reconciliation pass over a project or a whole group.
///
/// Every candidate file ends up in exactly one of `applied_count`,
/// `skipped_count` or `failed_count`. Failures that happen before any file
/// is reached (rules, project or group listing) only add an `errors` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub total_projects: usize,
    pub total_candidates: usize,
    pub applied_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub errors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ReconciliationResult {
    pub fn empty() -> Self {
        Self {
            total_projects: 0,
            total_candidates: 0,
            applied_count: 0,
            skipped_count: 0,
            failed_count: 0,
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// A result carrying a single error and no candidates.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::empty();
        result.errors.push(message.into());
        result
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "Configured {}/{} files across {} projects ({} already compliant, {} failed)",
            self.applied_count,
            self.total_candidates,
            self.total_projects,
            self.skipped_count,
            self.failed_count
        )
    }

    pub(crate) fn record_file(&mut self, outcome: FileOutcome, describe: impl FnOnce(&str) -> String) {
        self.total_candidates += 1;
        match outcome {
            FileOutcome::Skipped => self.skipped_count += 1,
            FileOutcome::Applied => self.applied_count += 1,
            FileOutcome::Failed(reason) => {
                self.failed_count += 1;
                self.errors.push(describe(&reason));
            }
        }
    }

    /// Folds a project-level result into a group-level one.
    pub(crate) fn absorb(&mut self, project: ReconciliationResult) {
        self.total_projects += project.total_projects;
        self.total_candidates += project.total_candidates;
        self.applied_count += project.applied_count;
        self.skipped_count += project.skipped_count;
        self.failed_count += project.failed_count;
        self.errors.extend(project.errors);
    }
}

/// A file whose live parser options differ from the expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergentFile {
    pub project_id: ProjectId,
    pub file_id: FileId,
    pub file_name: String,
}

/// Read-only divergence preview over a group.
///
/// `errors` names every project that could not be inspected, so an empty
/// `files` list only means "all compliant" when `errors` is empty too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivergenceReport {
    pub files: Vec<DivergentFile>,
    pub errors: Vec<String>,
}

impl DivergenceReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compliance summary of a single project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub project_id: ProjectId,
    pub is_configured: bool,
    pub total_files: usize,
    pub configured_files: usize,
    pub unconfigured_files: Vec<String>,
}
