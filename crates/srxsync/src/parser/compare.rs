//! Field-by-field comparison of expected and live parser options.
//!
//! No field is optional: a key missing on the remote side, or carrying a
//! value of the wrong JSON type, counts as divergent. Absent parser options
//! make every field divergent. Keys the expected configuration does not know
//! about are ignored.

use serde_json::Value;

use super::expected::ExpectedConfiguration;
use crate::remote::ParserOptions;

/// Outcome of comparing one file's parser options with the expectation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comparison {
    /// Wire names of the fields that differ, in a fixed order.
    pub mismatched_fields: Vec<&'static str>,
}

impl Comparison {
    pub fn is_compliant(&self) -> bool {
        self.mismatched_fields.is_empty()
    }
}

pub fn compare(expected: &ExpectedConfiguration, actual: Option<&ParserOptions>) -> Comparison {
    let checks: [(&'static str, Value); 6] = [
        ("translateContent", Value::Bool(expected.translate_content)),
        ("translateAttributes", Value::Bool(expected.translate_attributes)),
        (
            "translatableElements",
            Value::String(expected.translatable_elements.clone()),
        ),
        (
            "enableContentSegmentation",
            Value::Bool(expected.enable_content_segmentation),
        ),
        (
            "useCustomSegmentationRules",
            Value::Bool(expected.use_custom_segmentation_rules),
        ),
        ("srxRules", Value::String(expected.segmentation_rules.clone())),
    ];

    let mismatched_fields = checks
        .into_iter()
        .filter(|(key, want)| actual.and_then(|options| options.get(*key)) != Some(want))
        .map(|(key, _)| key)
        .collect();

    Comparison { mismatched_fields }
}
