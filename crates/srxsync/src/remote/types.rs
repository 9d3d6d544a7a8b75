use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type ProjectId = u64;
pub type FileId = u64;

/// Opaque parser options object as stored by the platform.
pub type ParserOptions = Map<String, Value>;

/// A project on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub source_language_id: String,
    #[serde(default)]
    pub target_language_ids: Vec<String>,
}

/// A source file inside a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: FileId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub parser_id: Option<u64>,
    #[serde(default)]
    pub parser_options: Option<ParserOptions>,
}

/// Returns true if the file name has an `.xml` suffix, ignoring case.
pub fn is_xml_file(name: &str) -> bool {
    name.to_lowercase().ends_with(".xml")
}
