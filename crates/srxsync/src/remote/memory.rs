//! In-process [`RemoteInventory`] with call counting and failure injection.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::error::RemoteError;
use super::types::{is_xml_file, FileId, ParserOptions, ProjectId, RemoteFile, RemoteProject};
use super::RemoteInventory;
use crate::parser::{ExpectedConfiguration, XML_PARSER_ID};

/// Number of calls received per capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_projects: usize,
    pub list_files: usize,
    pub get_configuration: usize,
    pub update_configuration: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_projects + self.list_files + self.get_configuration + self.update_configuration
    }
}

#[derive(Debug, Default)]
struct InventoryState {
    projects: Vec<RemoteProject>,
    files: BTreeMap<ProjectId, Vec<RemoteFile>>,
    fail_group_listing: bool,
    failing_listings: HashSet<ProjectId>,
    failing_fetches: HashSet<(ProjectId, FileId)>,
    failing_updates: HashSet<(ProjectId, FileId)>,
    calls: CallCounts,
}

/// Keeps projects and files in memory.
///
/// Updates are applied to the stored file exactly as the platform would, so
/// a second pass observes the first pass's writes.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    state: Mutex<InventoryState>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InventoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_project(&self, project: RemoteProject) {
        let mut state = self.lock();
        state.files.entry(project.id).or_default();
        state.projects.push(project);
    }

    /// Adds a file to its project. Non-XML files are stored but never listed.
    pub fn add_file(&self, file: RemoteFile) {
        self.lock().files.entry(file.project_id).or_default().push(file);
    }

    pub fn fail_group_listing(&self) {
        self.lock().fail_group_listing = true;
    }

    pub fn fail_file_listing(&self, project_id: ProjectId) {
        self.lock().failing_listings.insert(project_id);
    }

    pub fn fail_fetch(&self, project_id: ProjectId, file_id: FileId) {
        self.lock().failing_fetches.insert((project_id, file_id));
    }

    pub fn fail_update(&self, project_id: ProjectId, file_id: FileId) {
        self.lock().failing_updates.insert((project_id, file_id));
    }

    /// Clears every injected failure.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.fail_group_listing = false;
        state.failing_listings.clear();
        state.failing_fetches.clear();
        state.failing_updates.clear();
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn reset_calls(&self) {
        self.lock().calls = CallCounts::default();
    }

    /// Current parser options of a stored file.
    pub fn parser_options(&self, project_id: ProjectId, file_id: FileId) -> Option<ParserOptions> {
        self.lock()
            .files
            .get(&project_id)
            .and_then(|files| files.iter().find(|f| f.id == file_id))
            .and_then(|f| f.parser_options.clone())
    }

    /// Overwrites a stored file's parser options, simulating an edit made
    /// directly on the platform.
    pub fn set_parser_options(
        &self,
        project_id: ProjectId,
        file_id: FileId,
        options: Option<ParserOptions>,
    ) {
        let mut state = self.lock();
        if let Some(file) = state
            .files
            .get_mut(&project_id)
            .and_then(|files| files.iter_mut().find(|f| f.id == file_id))
        {
            file.parser_options = options;
        }
    }
}

fn unavailable(what: String) -> RemoteError {
    RemoteError::Unavailable(format!("injected failure: {}", what))
}

#[async_trait]
impl RemoteInventory for InMemoryInventory {
    async fn list_projects_in_group(
        &self,
        group_id: &str,
    ) -> Result<Vec<RemoteProject>, RemoteError> {
        let mut state = self.lock();
        state.calls.list_projects += 1;
        if state.fail_group_listing {
            return Err(unavailable(format!("list projects of group {}", group_id)));
        }
        Ok(state
            .projects
            .iter()
            .filter(|p| p.group_id.is_some_and(|g| g.to_string() == group_id))
            .cloned()
            .collect())
    }

    async fn list_files(&self, project_id: ProjectId) -> Result<Vec<RemoteFile>, RemoteError> {
        let mut state = self.lock();
        state.calls.list_files += 1;
        if state.failing_listings.contains(&project_id) {
            return Err(unavailable(format!("list files of project {}", project_id)));
        }
        let files = state.files.get(&project_id).ok_or_else(|| {
            RemoteError::status(&format!("/projects/{}/files", project_id), 404, "not found")
        })?;
        Ok(files.iter().filter(|f| is_xml_file(&f.name)).cloned().collect())
    }

    async fn get_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
    ) -> Result<Option<ParserOptions>, RemoteError> {
        let mut state = self.lock();
        state.calls.get_configuration += 1;
        if state.failing_fetches.contains(&(project_id, file_id)) {
            return Err(unavailable(format!(
                "get file {} of project {}",
                file_id, project_id
            )));
        }
        state
            .files
            .get(&project_id)
            .and_then(|files| files.iter().find(|f| f.id == file_id))
            .map(|f| f.parser_options.clone())
            .ok_or_else(|| {
                RemoteError::status(
                    &format!("/projects/{}/files/{}", project_id, file_id),
                    404,
                    "not found",
                )
            })
    }

    async fn update_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
        configuration: &ExpectedConfiguration,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.calls.update_configuration += 1;
        if state.failing_updates.contains(&(project_id, file_id)) {
            return Err(unavailable(format!(
                "update file {} of project {}",
                file_id, project_id
            )));
        }
        let file = state
            .files
            .get_mut(&project_id)
            .and_then(|files| files.iter_mut().find(|f| f.id == file_id))
            .ok_or_else(|| {
                RemoteError::status(
                    &format!("/projects/{}/files/{}", project_id, file_id),
                    404,
                    "not found",
                )
            })?;
        file.parser_id = Some(XML_PARSER_ID);
        file.parser_options = Some(configuration.to_parser_options());
        Ok(())
    }
}
