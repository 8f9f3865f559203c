//! The mutable column-to-field assignment table.
//!
//! Every column of the upload has exactly one entry from construction on;
//! [`AssignmentStore::set`] is the only way to change an entry and performs
//! no validation, so in-progress states with conflicts stay representable.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use taxmap_model::{Assignment, TargetSchema};

/// Current assignment of every source column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentStore {
    /// Upload header order; never grows or shrinks after construction.
    columns: Vec<String>,
    entries: BTreeMap<String, Assignment>,
}

impl AssignmentStore {
    /// Create a store with every column unassigned.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered = Vec::new();
        let mut entries = BTreeMap::new();
        for column in columns {
            let column = column.into();
            if entries.insert(column.clone(), Assignment::Unassigned).is_none() {
                ordered.push(column);
            }
        }
        Self {
            columns: ordered,
            entries,
        }
    }

    /// Bind `column` to `target`.
    ///
    /// Returns `false` (and changes nothing) when the column is not part of
    /// the upload.
    pub fn set(&mut self, column: &str, target: Assignment) -> bool {
        match self.entries.get_mut(column) {
            Some(entry) => {
                if *entry != target {
                    debug!(column, from = %entry, to = %target, "assignment changed");
                    *entry = target;
                }
                true
            }
            None => {
                warn!(column, "ignoring assignment for unknown column");
                false
            }
        }
    }

    pub fn get(&self, column: &str) -> Option<&Assignment> {
        self.entries.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.entries.contains_key(column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Entries in upload column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Assignment)> {
        self.columns.iter().filter_map(|column| {
            self.entries
                .get(column)
                .map(|assignment| (column.as_str(), assignment))
        })
    }

    /// Columns currently bound to `target`, in column order.
    pub fn columns_for(&self, target: &str) -> Vec<&str> {
        self.iter()
            .filter(|(_, a)| a.target() == Some(target))
            .map(|(column, _)| column)
            .collect()
    }

    /// Only the entries bound to a real target field, as wire strings.
    ///
    /// This is the shape that gets persisted as a template and compared
    /// against the AI suggestion.
    pub fn sanitized(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(column, a)| a.target().map(|t| (column.clone(), t.to_string())))
            .collect()
    }

    /// Schema fields not claimed by any column.
    pub fn unmapped_fields<'a>(&self, schema: &'a TargetSchema) -> Vec<&'a str> {
        schema
            .fields
            .iter()
            .filter(|f| !self.entries.values().any(|a| a.target() == Some(f.key.as_str())))
            .map(|f| f.key.as_str())
            .collect()
    }

    /// Count entries by state.
    pub fn summary(&self, conflicts: usize) -> MappingSummary {
        let mut summary = MappingSummary {
            total_columns: self.columns.len(),
            conflicts,
            ..MappingSummary::default()
        };
        for assignment in self.entries.values() {
            match assignment {
                Assignment::Field(_) => summary.mapped += 1,
                Assignment::Skip => summary.skipped += 1,
                Assignment::Unassigned => summary.unassigned += 1,
            }
        }
        summary
    }
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingSummary {
    /// Columns in the upload.
    pub total_columns: usize,
    /// Columns bound to a target field.
    pub mapped: usize,
    /// Columns explicitly skipped.
    pub skipped: usize,
    /// Columns with no decision yet.
    pub unassigned: usize,
    /// Target fields claimed by more than one column.
    pub conflicts: usize,
}
