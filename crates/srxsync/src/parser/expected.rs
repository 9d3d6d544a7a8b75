use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RulesError;
use crate::rules::RulesDocument;

/// Parser id the platform assigns to its XML parser.
pub const XML_PARSER_ID: u64 = 3;

const TRANSLATE_CONTENT: bool = true;
const TRANSLATE_ATTRIBUTES: bool = true;
/// Empty means "every element is translatable".
const TRANSLATABLE_ELEMENTS: &str = "";
const ENABLE_CONTENT_SEGMENTATION: bool = true;
const USE_CUSTOM_SEGMENTATION_RULES: bool = true;

/// Canonical parser settings every XML file in the group should carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedConfiguration {
    pub translate_content: bool,
    pub translate_attributes: bool,
    pub translatable_elements: String,
    pub enable_content_segmentation: bool,
    pub use_custom_segmentation_rules: bool,
    #[serde(rename = "srxRules")]
    pub segmentation_rules: String,
}

impl ExpectedConfiguration {
    /// Wire representation sent as the file's `parserOptions`.
    pub fn to_parser_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("translateContent".into(), self.translate_content.into());
        options.insert("translateAttributes".into(), self.translate_attributes.into());
        options.insert(
            "translatableElements".into(),
            self.translatable_elements.clone().into(),
        );
        options.insert(
            "enableContentSegmentation".into(),
            self.enable_content_segmentation.into(),
        );
        options.insert(
            "useCustomSegmentationRules".into(),
            self.use_custom_segmentation_rules.into(),
        );
        options.insert("srxRules".into(), self.segmentation_rules.clone().into());
        options
    }
}

/// Builds the expected configuration from a rules document.
///
/// Validates the document itself so an invalid document can never produce a
/// configuration.
pub fn derive(document: &RulesDocument) -> Result<ExpectedConfiguration, RulesError> {
    if !document.is_valid() {
        return Err(RulesError::Invalid {
            path: document.source_path().to_path_buf(),
        });
    }

    Ok(ExpectedConfiguration {
        translate_content: TRANSLATE_CONTENT,
        translate_attributes: TRANSLATE_ATTRIBUTES,
        translatable_elements: TRANSLATABLE_ELEMENTS.to_string(),
        enable_content_segmentation: ENABLE_CONTENT_SEGMENTATION,
        use_custom_segmentation_rules: USE_CUSTOM_SEGMENTATION_RULES,
        segmentation_rules: document.content().to_string(),
    })
}
