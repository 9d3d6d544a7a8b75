//! Reconciler: derive → diff → converge.
//!
//! Every scope isolates its failures: a failed file is recorded and the
//! project carries on, a project whose files cannot be listed is recorded and
//! the group carries on. Only a rules failure aborts a pass, because there is
//! nothing meaningful to apply without an expected configuration.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::result::{
    DivergenceReport, DivergentFile, FileOutcome, ProjectStatus, ReconciliationResult,
};
use crate::error::{RulesError, SrxSyncError};
use crate::parser::{compare, derive, ExpectedConfiguration};
use crate::remote::{ProjectId, RemoteError, RemoteFile, RemoteInventory, RemoteProject};
use crate::rules::RulesProvider;

/// A group pass together with whether the group's projects could be listed.
pub(crate) struct GroupPass {
    pub result: ReconciliationResult,
    pub reached_projects: bool,
}

/// Converges remote parser options to the configuration derived from the
/// rules document.
pub struct Reconciler {
    inventory: Arc<dyn RemoteInventory>,
    rules: Arc<RulesProvider>,
    /// Group operations only touch these projects when non-empty.
    allowed_projects: Vec<ProjectId>,
    file_concurrency: usize,
}

impl Reconciler {
    pub fn new(inventory: Arc<dyn RemoteInventory>, rules: Arc<RulesProvider>) -> Self {
        Self {
            inventory,
            rules,
            allowed_projects: Vec::new(),
            file_concurrency: 1,
        }
    }

    /// Restricts group operations to the given project ids. Empty means all.
    pub fn with_allowed_projects(mut self, project_ids: Vec<ProjectId>) -> Self {
        self.allowed_projects = project_ids;
        self
    }

    /// Number of files of one project reconciled at the same time.
    pub fn with_file_concurrency(mut self, concurrency: usize) -> Self {
        self.file_concurrency = concurrency.max(1);
        self
    }

    pub fn inventory(&self) -> &Arc<dyn RemoteInventory> {
        &self.inventory
    }

    pub fn rules(&self) -> &RulesProvider {
        &self.rules
    }

    /// Loads the rules document and derives the expected configuration.
    pub async fn expected_configuration(&self) -> Result<ExpectedConfiguration, RulesError> {
        let document = self.rules.load().await?;
        derive(&document)
    }

    /// Brings one file in line with the expected configuration.
    pub async fn reconcile_file(&self, project_id: ProjectId, file: &RemoteFile) -> FileOutcome {
        match self.expected_configuration().await {
            Ok(expected) => self.converge_file(&expected, project_id, file).await,
            Err(e) => {
                error!("Cannot reconcile {}: {}", file.name, e);
                FileOutcome::Failed(e.to_string())
            }
        }
    }

    /// Reconciles every XML file of a project.
    pub async fn reconcile_project(&self, project_id: ProjectId) -> ReconciliationResult {
        let expected = match self.expected_configuration().await {
            Ok(expected) => expected,
            Err(e) => return rules_failure(e),
        };

        match self.reconcile_project_with(&expected, project_id).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to list files of project {}: {}", project_id, e);
                let mut result = ReconciliationResult::failed(format!(
                    "Failed to process project {}: {}",
                    project_id, e
                ));
                result.total_projects = 1;
                result
            }
        }
    }

    /// Reconciles every project of a group.
    pub async fn reconcile_group(&self, group_id: &str) -> ReconciliationResult {
        match self.expected_configuration().await {
            Ok(expected) => self.reconcile_group_with(&expected, group_id).await.result,
            Err(e) => rules_failure(e),
        }
    }

    /// Group pass against an already derived configuration.
    pub(crate) async fn reconcile_group_with(
        &self,
        expected: &ExpectedConfiguration,
        group_id: &str,
    ) -> GroupPass {
        let span = info_span!("reconcile_group", group = %group_id);
        async {
            let projects = match self.target_projects(group_id).await {
                Ok(projects) => projects,
                Err(e) => {
                    error!("Failed to list projects for group {}: {}", group_id, e);
                    return GroupPass {
                        result: ReconciliationResult::failed(format!(
                            "Failed to process project group {}: {}",
                            group_id, e
                        )),
                        reached_projects: false,
                    };
                }
            };

            let mut result = ReconciliationResult::empty();
            for project in &projects {
                match self.reconcile_project_with(expected, project.id).await {
                    Ok(project_result) => result.absorb(project_result),
                    Err(e) => {
                        warn!("Skipping project {} ({}): {}", project.name, project.id, e);
                        result.total_projects += 1;
                        result.errors.push(format!(
                            "Failed to process project {} ({}): {}",
                            project.name, project.id, e
                        ));
                    }
                }
            }

            info!("Group {}: {}", group_id, result.summary());
            GroupPass {
                result,
                reached_projects: true,
            }
        }
        .instrument(span)
        .await
    }

    /// Lists files whose configuration differs from the expectation without
    /// changing anything.
    ///
    /// A project whose files cannot be listed is named in the report's
    /// errors and the preview carries on. A file whose configuration cannot
    /// be read is reported as divergent.
    pub async fn check_divergent_files(
        &self,
        group_id: &str,
    ) -> Result<DivergenceReport, SrxSyncError> {
        let expected = self.expected_configuration().await?;
        let projects = self.target_projects(group_id).await?;

        let mut report = DivergenceReport::default();
        for project in &projects {
            let files = match self.inventory.list_files(project.id).await {
                Ok(files) => files,
                Err(e) => {
                    warn!("Cannot preview project {} ({}): {}", project.name, project.id, e);
                    report.errors.push(format!(
                        "Failed to inspect project {} ({}): {}",
                        project.name, project.id, e
                    ));
                    continue;
                }
            };
            for file in files {
                if self.is_divergent(&expected, project.id, &file).await {
                    report.files.push(DivergentFile {
                        project_id: project.id,
                        file_id: file.id,
                        file_name: file.name,
                    });
                }
            }
        }

        debug!(
            "Group {} has {} divergent files, {} projects not inspected",
            group_id,
            report.files.len(),
            report.errors.len()
        );
        Ok(report)
    }

    /// Compliance summary for one project. Read-only.
    pub async fn project_status(&self, project_id: ProjectId) -> Result<ProjectStatus, SrxSyncError> {
        let expected = self.expected_configuration().await?;
        let files = self.inventory.list_files(project_id).await?;

        let total_files = files.len();
        let mut unconfigured_files = Vec::new();
        for file in files {
            if self.is_divergent(&expected, project_id, &file).await {
                unconfigured_files.push(file.name);
            }
        }

        Ok(ProjectStatus {
            project_id,
            is_configured: unconfigured_files.is_empty(),
            total_files,
            configured_files: total_files - unconfigured_files.len(),
            unconfigured_files,
        })
    }

    /// Projects of the group that group operations act on.
    pub async fn target_projects(&self, group_id: &str) -> Result<Vec<RemoteProject>, RemoteError> {
        let projects = self.inventory.list_projects_in_group(group_id).await?;
        if self.allowed_projects.is_empty() {
            return Ok(projects);
        }

        let allowed: Vec<RemoteProject> = projects
            .into_iter()
            .filter(|p| self.allowed_projects.contains(&p.id))
            .collect();
        debug!(
            "Filtered group {} to {} allowed projects",
            group_id,
            allowed.len()
        );
        Ok(allowed)
    }

    async fn reconcile_project_with(
        &self,
        expected: &ExpectedConfiguration,
        project_id: ProjectId,
    ) -> Result<ReconciliationResult, RemoteError> {
        let files = self.inventory.list_files(project_id).await?;
        debug!("Project {} has {} XML files", project_id, files.len());

        let outcomes: Vec<(RemoteFile, FileOutcome)> = stream::iter(files)
            .map(|file| async move {
                let outcome = self.converge_file(expected, project_id, &file).await;
                (file, outcome)
            })
            .buffered(self.file_concurrency)
            .collect()
            .await;

        let mut result = ReconciliationResult::empty();
        result.total_projects = 1;
        for (file, outcome) in outcomes {
            result.record_file(outcome, |reason| {
                format!(
                    "Failed to configure {} (file {}) in project {}: {}",
                    file.name, file.id, project_id, reason
                )
            });
        }
        Ok(result)
    }

    async fn converge_file(
        &self,
        expected: &ExpectedConfiguration,
        project_id: ProjectId,
        file: &RemoteFile,
    ) -> FileOutcome {
        let current = match self
            .inventory
            .get_file_configuration(project_id, file.id)
            .await
        {
            Ok(current) => current,
            Err(e) => {
                warn!(
                    "Could not read configuration of {} in project {}: {}",
                    file.name, project_id, e
                );
                return FileOutcome::Failed(format!("could not read current configuration: {}", e));
            }
        };

        let comparison = compare(expected, current.as_ref());
        if comparison.is_compliant() {
            debug!("{} in project {} already compliant", file.name, project_id);
            return FileOutcome::Skipped;
        }

        debug!(
            "{} in project {} diverges on {:?}",
            file.name, project_id, comparison.mismatched_fields
        );

        match self
            .inventory
            .update_file_configuration(project_id, file.id, expected)
            .await
        {
            Ok(()) => {
                info!(
                    "Applied segmentation configuration to {} in project {}",
                    file.name, project_id
                );
                FileOutcome::Applied
            }
            Err(e) => {
                warn!(
                    "Failed to configure {} in project {}: {}",
                    file.name, project_id, e
                );
                FileOutcome::Failed(e.to_string())
            }
        }
    }

    async fn is_divergent(
        &self,
        expected: &ExpectedConfiguration,
        project_id: ProjectId,
        file: &RemoteFile,
    ) -> bool {
        match self
            .inventory
            .get_file_configuration(project_id, file.id)
            .await
        {
            Ok(current) => !compare(expected, current.as_ref()).is_compliant(),
            Err(e) => {
                warn!(
                    "Could not read configuration of {} in project {}, treating as divergent: {}",
                    file.name, project_id, e
                );
                true
            }
        }
    }
}

pub(crate) fn rules_failure(err: RulesError) -> ReconciliationResult {
    error!("Cannot derive expected configuration: {}", err);
    ReconciliationResult::failed(format!("Failed to derive expected configuration: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryInventory;
    use tempfile::TempDir;

    const RULES: &str = "<srx><body><rule>...</rule></body></srx>";

    struct Fixture {
        _dir: TempDir,
        inventory: Arc<InMemoryInventory>,
        reconciler: Reconciler,
    }

    fn fixture(rules: Option<&str>) -> Fixture {
        let dir = TempDir::new().unwrap();
        if let Some(rules) = rules {
            std::fs::write(dir.path().join("rules.srx"), rules).unwrap();
        }
        let inventory = Arc::new(InMemoryInventory::new());
        let provider = Arc::new(RulesProvider::new(dir.path(), "rules.srx"));
        let reconciler = Reconciler::new(inventory.clone(), provider);
        Fixture {
            _dir: dir,
            inventory,
            reconciler,
        }
    }

    fn project(id: ProjectId) -> RemoteProject {
        RemoteProject {
            id,
            name: format!("project-{}", id),
            group_id: Some(24),
            source_language_id: "en".into(),
            target_language_ids: vec!["de".into()],
        }
    }

    fn file(id: u64, project_id: ProjectId, name: &str) -> RemoteFile {
        RemoteFile {
            id,
            project_id,
            name: name.into(),
            path: format!("/{}", name),
            status: "active".into(),
            kind: "xml".into(),
            parser_id: None,
            parser_options: None,
        }
    }

    #[tokio::test]
    async fn test_reconcile_file_applies_then_skips() {
        let fx = fixture(Some(RULES));
        fx.inventory.add_project(project(1));
        let f = file(10, 1, "a.xml");
        fx.inventory.add_file(f.clone());

        assert_eq!(fx.reconciler.reconcile_file(1, &f).await, FileOutcome::Applied);
        assert_eq!(fx.reconciler.reconcile_file(1, &f).await, FileOutcome::Skipped);
        assert_eq!(fx.inventory.calls().update_configuration, 1);
    }

    #[tokio::test]
    async fn test_reconcile_file_with_invalid_rules_fails_without_remote_calls() {
        let fx = fixture(Some("<invalid/>"));
        let f = file(10, 1, "a.xml");

        let outcome = fx.reconciler.reconcile_file(1, &f).await;
        assert!(matches!(outcome, FileOutcome::Failed(_)));
        assert_eq!(fx.inventory.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_file_failure() {
        let fx = fixture(Some(RULES));
        fx.inventory.add_project(project(1));
        let f = file(10, 1, "a.xml");
        fx.inventory.add_file(f.clone());
        fx.inventory.fail_fetch(1, 10);

        let outcome = fx.reconciler.reconcile_file(1, &f).await;
        assert!(matches!(outcome, FileOutcome::Failed(reason) if reason.contains("current configuration")));
        assert_eq!(fx.inventory.calls().update_configuration, 0);
    }

    #[tokio::test]
    async fn test_missing_rules_abort_group_pass() {
        let fx = fixture(None);
        fx.inventory.add_project(project(1));

        let result = fx.reconciler.reconcile_group("24").await;
        assert_eq!(result.total_candidates, 0);
        assert_eq!(result.applied_count, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("not found"));
        assert_eq!(fx.inventory.calls().total(), 0);
    }

    #[tokio::test]
    async fn test_allowed_projects_filter_group() {
        let fx = fixture(Some(RULES));
        fx.inventory.add_project(project(1));
        fx.inventory.add_project(project(2));
        fx.inventory.add_file(file(10, 1, "a.xml"));
        fx.inventory.add_file(file(20, 2, "b.xml"));
        let reconciler = fx.reconciler.with_allowed_projects(vec![2]);

        let result = reconciler.reconcile_group("24").await;
        assert_eq!(result.total_projects, 1);
        assert_eq!(result.applied_count, 1);
        assert!(fx.inventory.parser_options(1, 10).is_none());
        assert!(fx.inventory.parser_options(2, 20).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_files_keep_listing_order_in_errors() {
        let fx = fixture(Some(RULES));
        fx.inventory.add_project(project(1));
        for id in 0..6 {
            fx.inventory.add_file(file(id, 1, &format!("f{}.xml", id)));
        }
        fx.inventory.fail_update(1, 1);
        fx.inventory.fail_update(1, 4);
        let reconciler = fx.reconciler.with_file_concurrency(4);

        let result = reconciler.reconcile_project(1).await;
        assert_eq!(result.total_candidates, 6);
        assert_eq!(result.applied_count, 4);
        assert_eq!(result.failed_count, 2);
        assert!(result.errors[0].contains("f1.xml"));
        assert!(result.errors[1].contains("f4.xml"));
    }

    #[tokio::test]
    async fn test_project_status_lists_unconfigured() {
        let fx = fixture(Some(RULES));
        fx.inventory.add_project(project(1));
        fx.inventory.add_file(file(10, 1, "a.xml"));
        fx.inventory.add_file(file(11, 1, "b.xml"));
        let a = file(10, 1, "a.xml");
        fx.reconciler.reconcile_file(1, &a).await;

        let status = fx.reconciler.project_status(1).await.unwrap();
        assert_eq!(status.total_files, 2);
        assert_eq!(status.configured_files, 1);
        assert_eq!(status.unconfigured_files, vec!["b.xml"]);
        assert!(!status.is_configured);
    }
}
