//! Header and sample rows of one uploaded spreadsheet.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One sample row keyed by source column name.
pub type SampleRow = BTreeMap<String, String>;

/// Column names (in header order) plus the sample rows read from an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleData {
    columns: Vec<String>,
    rows: Vec<SampleRow>,
}

impl SampleData {
    /// Validate the header and wrap the rows.
    ///
    /// Column names are trimmed; they must be non-empty and unique.
    pub fn new(columns: Vec<String>, rows: Vec<SampleRow>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        let mut cleaned = Vec::with_capacity(columns.len());
        for (index, raw) in columns.into_iter().enumerate() {
            let name = raw.trim().to_string();
            if name.is_empty() {
                return Err(ModelError::EmptyColumnName { index });
            }
            if !seen.insert(name.clone()) {
                return Err(ModelError::DuplicateColumn(name));
            }
            cleaned.push(name);
        }
        Ok(Self {
            columns: cleaned,
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    /// Cell value for a column in a row, empty when the row lacks it.
    pub fn cell<'a>(&'a self, row: usize, column: &str) -> &'a str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    /// First `limit` non-blank values of a column, in row order.
    pub fn values_for(&self, column: &str, limit: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .take(limit)
            .collect()
    }
}
