use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Last confirmed column-name to target-key dictionary for a report type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    pub report_type: String,
    pub column_mappings: BTreeMap<String, String>,
}

impl MappingTemplate {
    pub fn new(report_type: impl Into<String>, column_mappings: BTreeMap<String, String>) -> Self {
        Self {
            report_type: report_type.into(),
            column_mappings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.column_mappings.is_empty()
    }
}
