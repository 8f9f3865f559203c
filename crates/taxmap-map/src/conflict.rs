//! Detection of target fields claimed by more than one column.
//!
//! The report is rebuilt from the store on every call rather than kept up to
//! date incrementally, so it can never disagree with the assignment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::AssignmentStore;

/// Every target field currently bound to two or more columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    /// Target key to the competing columns, in upload column order.
    groups: BTreeMap<String, Vec<String>>,
}

impl ConflictReport {
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_clear(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &BTreeMap<String, Vec<String>> {
        &self.groups
    }

    pub fn columns_for(&self, target: &str) -> Option<&[String]> {
        self.groups.get(target).map(Vec::as_slice)
    }

    pub fn is_conflicted(&self, target: &str) -> bool {
        self.groups.contains_key(target)
    }

    /// Target key a column is fighting over, if any.
    pub fn target_of(&self, column: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, columns)| columns.iter().any(|c| c == column))
            .map(|(target, _)| target.as_str())
    }
}

/// Group columns by target key and keep the groups with two or more members.
///
/// Unassigned and skipped columns never conflict.
pub fn detect_conflicts(store: &AssignmentStore) -> ConflictReport {
    let mut by_target: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (column, assignment) in store.iter() {
        if let Some(target) = assignment.target() {
            by_target
                .entry(target.to_string())
                .or_default()
                .push(column.to_string());
        }
    }
    by_target.retain(|_, columns| columns.len() >= 2);
    ConflictReport { groups: by_target }
}
