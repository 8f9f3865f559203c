//! Read-only projection of sample rows through the current assignment.

use std::collections::BTreeSet;

use serde::Serialize;

use taxmap_model::SampleData;

use crate::store::AssignmentStore;

/// Sample rows shown in the preview.
pub const PREVIEW_ROW_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewColumn {
    pub target: String,
    pub source: String,
}

/// Sample rows re-keyed by target field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreviewTable {
    pub columns: Vec<PreviewColumn>,
    /// One cell per entry of `columns`; blank where the row had no value.
    pub rows: Vec<Vec<String>>,
}

impl PreviewTable {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Project up to `limit` sample rows through every mapped target field.
///
/// Columns appear in upload order of the source column that first claims
/// each target, not in schema order.
pub fn project_preview(
    store: &AssignmentStore,
    samples: &SampleData,
    limit: usize,
) -> PreviewTable {
    let mut seen = BTreeSet::new();
    let columns: Vec<PreviewColumn> = store
        .iter()
        .filter_map(|(column, assignment)| {
            let target = assignment.target()?;
            seen.insert(target).then(|| PreviewColumn {
                target: target.to_string(),
                source: column.to_string(),
            })
        })
        .collect();

    let rows = (0..samples.rows().len().min(limit))
        .map(|row| {
            columns
                .iter()
                .map(|c| samples.cell(row, &c.source).to_string())
                .collect()
        })
        .collect();

    PreviewTable { columns, rows }
}
