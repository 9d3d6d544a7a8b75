use std::path::{Path, PathBuf};

/// Marker for the SRX root element.
const ROOT_MARKER: &str = "<srx";
/// Marker for the body section holding language rules.
const BODY_MARKER: &str = "<body>";
/// Marker for an individual break rule.
const RULE_MARKER: &str = "<rule";

/// Raw text of a segmentation rules file, as read for a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesDocument {
    content: String,
    source_path: PathBuf,
}

impl RulesDocument {
    pub fn new(content: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            content: content.into(),
            source_path: source_path.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Shorthand for [`validate`] on this document's content.
    pub fn is_valid(&self) -> bool {
        validate(Some(&self.content))
    }
}

/// Shallow structural check of a rules document.
///
/// Only checks that the root, body and rule markers are present. This guards
/// against pointing the service at the wrong file; it does not validate SRX
/// semantics, which remain the platform's segmentation engine's concern.
pub fn validate(content: Option<&str>) -> bool {
    match content {
        Some(content) if !content.is_empty() => {
            content.contains(ROOT_MARKER)
                && content.contains(BODY_MARKER)
                && content.contains(RULE_MARKER)
        }
        _ => false,
    }
}
