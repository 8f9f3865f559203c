//! Request and response shapes of the external mapping-suggestion service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sample::SampleRow;

/// An AI-proposed pairing of a column with a target field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCandidate {
    /// Target field key.
    pub field: String,
    /// Heuristic score in `[0, 1]`; candidates of one column need not sum to 1.
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub columns: Vec<String>,
    pub sample_rows: Vec<SampleRow>,
    pub report_type: String,
}

/// Response of `suggestMapping`.
///
/// Every field defaults when missing so partial payloads still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionResponse {
    /// Column name to target key (wire tokens, see [`crate::Assignment`]).
    pub mappings: BTreeMap<String, String>,
    /// Overall confidence of the suggestion.
    pub confidence: f64,
    /// Per-column confidence.
    pub field_confidence: BTreeMap<String, f64>,
    /// Columns the service could not place.
    pub unmapped: Vec<String>,
    pub candidates: BTreeMap<String, Vec<FieldCandidate>>,
    /// Informational only; the engine detects conflicts itself.
    pub conflicts: Vec<serde_json::Value>,
}

impl SuggestionResponse {
    /// Score this response's candidate list holds for `field` on `column`.
    pub fn candidate_score(&self, column: &str, field: &str) -> Option<f64> {
        candidate_score(&self.candidates, column, field)
    }
}

/// Score a column's candidate list holds for `field`, if any.
pub fn candidate_score(
    candidates: &BTreeMap<String, Vec<FieldCandidate>>,
    column: &str,
    field: &str,
) -> Option<f64> {
    candidates
        .get(column)?
        .iter()
        .find(|c| c.field == field)
        .map(|c| c.confidence)
}
