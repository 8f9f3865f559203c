use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;

/// Divergence between the AI's suggestion and the confirmed mapping of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRecord {
    pub column: String,
    /// What the AI suggested; `Skip` when it suggested nothing.
    pub old_target: Assignment,
    /// What the user confirmed; `Skip` when the column was left out.
    pub new_target: Assignment,
    /// Up to three sample values so the column can be recognized by content.
    pub sample_values: Vec<String>,
}
