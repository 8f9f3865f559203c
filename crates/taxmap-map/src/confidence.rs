//! Confidence annotation for AI-suggested mappings.
//!
//! Confidence only informs visual emphasis; it never blocks progression.

use std::collections::BTreeMap;

use serde::Serialize;

use taxmap_model::SuggestionResponse;

/// Overall scores at or above this are [`ConfidenceBucket::High`].
pub const HIGH_CONFIDENCE: f64 = 0.85;

/// Overall scores at or above this are at least [`ConfidenceBucket::Medium`];
/// columns scoring below it are flagged as low confidence.
pub const MEDIUM_CONFIDENCE: f64 = 0.60;

/// Display bucket for the overall confidence of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    Low,
    Medium,
    High,
}

impl ConfidenceBucket {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            Self::High
        } else if score >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Returns a human-readable description of the bucket.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Confidence scores from the most recently applied suggestion.
///
/// Empty until a suggestion has been applied; with no scores nothing is
/// ever flagged, so an unmapped column is never "low confidence" by itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfidenceAnnotator {
    overall: Option<f64>,
    per_column: BTreeMap<String, f64>,
}

impl ConfidenceAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all scores with those of `response`.
    pub fn update(&mut self, response: &SuggestionResponse) {
        self.overall = Some(response.confidence);
        self.per_column = response.field_confidence.clone();
    }

    pub fn bucket(&self) -> Option<ConfidenceBucket> {
        self.overall.map(ConfidenceBucket::from_score)
    }

    pub fn column_confidence(&self, column: &str) -> Option<f64> {
        self.per_column.get(column).copied()
    }

    pub fn is_low_confidence(&self, column: &str) -> bool {
        self.column_confidence(column)
            .is_some_and(|score| score < MEDIUM_CONFIDENCE)
    }
}
