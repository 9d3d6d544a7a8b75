//! Builders for remote fixtures.

#![allow(dead_code)]

use serde_json::Value;
use srxsync::{ParserOptions, RemoteFile, RemoteProject};

pub const GROUP_ID: u64 = 24;

pub const RULES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<srx version="2.0">
  <header segmentsubflows="yes" cascade="no"/>
  <body>
    <languagerules>
      <languagerule languagerulename="Default">
        <rule break="no"><beforebreak>\b(Mr|Mrs|Dr)\.</beforebreak><afterbreak>\s</afterbreak></rule>
        <rule break="yes"><beforebreak>[\.\?!]+</beforebreak><afterbreak>\s</afterbreak></rule>
      </languagerule>
    </languagerules>
  </body>
</srx>"#;

/// Builder for `RemoteProject`.
pub struct ProjectBuilder {
    project: RemoteProject,
}

impl ProjectBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            project: RemoteProject {
                id,
                name: format!("project-{}", id),
                group_id: Some(GROUP_ID),
                source_language_id: "en".to_string(),
                target_language_ids: vec!["de".to_string(), "fr".to_string()],
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.project.name = name.to_string();
        self
    }

    pub fn group(mut self, group_id: u64) -> Self {
        self.project.group_id = Some(group_id);
        self
    }

    pub fn build(self) -> RemoteProject {
        self.project
    }
}

/// Builder for `RemoteFile`.
pub struct FileBuilder {
    file: RemoteFile,
}

impl FileBuilder {
    pub fn new(id: u64, project_id: u64, name: &str) -> Self {
        Self {
            file: RemoteFile {
                id,
                project_id,
                name: name.to_string(),
                path: format!("/{}", name),
                status: "active".to_string(),
                kind: "xml".to_string(),
                parser_id: None,
                parser_options: None,
            },
        }
    }

    pub fn options(mut self, options: ParserOptions) -> Self {
        self.file.parser_id = Some(3);
        self.file.parser_options = Some(options);
        self
    }

    pub fn build(self) -> RemoteFile {
        self.file
    }
}

/// Builder for raw parser options, starting from the compliant set for `rules`.
pub struct OptionsBuilder {
    options: ParserOptions,
}

impl OptionsBuilder {
    pub fn compliant(rules: &str) -> Self {
        let mut options = ParserOptions::new();
        options.insert("translateContent".into(), Value::Bool(true));
        options.insert("translateAttributes".into(), Value::Bool(true));
        options.insert("translatableElements".into(), Value::String(String::new()));
        options.insert("enableContentSegmentation".into(), Value::Bool(true));
        options.insert("useCustomSegmentationRules".into(), Value::Bool(true));
        options.insert("srxRules".into(), Value::String(rules.to_string()));
        Self { options }
    }

    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    pub fn without(mut self, key: &str) -> Self {
        self.options.remove(key);
        self
    }

    pub fn build(self) -> ParserOptions {
        self.options
    }
}
