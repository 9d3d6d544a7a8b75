//! Capability boundary to the translation platform.
//!
//! The reconciler only talks to the platform through [`RemoteInventory`].
//! [`HttpInventory`] is the production implementation; [`InMemoryInventory`]
//! keeps everything in process and is what the test suites drive.

pub mod error;
pub mod http;
pub mod memory;
pub mod types;

use async_trait::async_trait;

use crate::parser::ExpectedConfiguration;

pub use error::RemoteError;
pub use http::HttpInventory;
pub use memory::{CallCounts, InMemoryInventory};
pub use types::{is_xml_file, FileId, ParserOptions, ProjectId, RemoteFile, RemoteProject};

/// Read and write access to projects and files on the platform.
#[async_trait]
pub trait RemoteInventory: Send + Sync {
    /// Lists the projects belonging to a project group.
    async fn list_projects_in_group(&self, group_id: &str)
        -> Result<Vec<RemoteProject>, RemoteError>;

    /// Lists the XML files of a project. Names are matched on a
    /// case-insensitive `.xml` suffix.
    async fn list_files(&self, project_id: ProjectId) -> Result<Vec<RemoteFile>, RemoteError>;

    /// Fetches the live parser options of a file, `None` when it has none.
    async fn get_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
    ) -> Result<Option<ParserOptions>, RemoteError>;

    /// Replaces the file's parser options with `configuration` in full.
    async fn update_file_configuration(
        &self,
        project_id: ProjectId,
        file_id: FileId,
        configuration: &ExpectedConfiguration,
    ) -> Result<(), RemoteError>;
}
