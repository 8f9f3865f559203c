//! The value a source column is bound to.
//!
//! On the wire an assignment is a plain string: the empty string means
//! unassigned, [`SKIP_TOKEN`] means the user explicitly skipped the column,
//! and anything else is a target field key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Wire token for an explicitly skipped column.
pub const SKIP_TOKEN: &str = "__skip__";

/// Wire token for a column nobody has assigned yet.
pub const UNASSIGNED_TOKEN: &str = "";

/// Binding of a single source column.
///
/// `Unassigned` and `Skip` both mean "no target field claims this column".
/// Any number of columns may hold either of them at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Assignment {
    /// No decision has been made for the column.
    #[default]
    Unassigned,
    /// The column is intentionally left out of the report.
    Skip,
    /// The column feeds the target field with this key.
    Field(String),
}

impl Assignment {
    /// Build an assignment bound to a target field key.
    pub fn field(key: impl Into<String>) -> Self {
        Self::from_wire(&key.into())
    }

    /// Parse a wire token.
    pub fn from_wire(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self::Unassigned
        } else if trimmed == SKIP_TOKEN {
            Self::Skip
        } else {
            Self::Field(trimmed.to_string())
        }
    }

    /// Wire token for this assignment.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Unassigned => UNASSIGNED_TOKEN,
            Self::Skip => SKIP_TOKEN,
            Self::Field(key) => key,
        }
    }

    /// Target field key, if the column is bound to one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Field(key) => Some(key),
            Self::Unassigned | Self::Skip => None,
        }
    }

    /// Collapse `Unassigned` into `Skip`.
    ///
    /// Downstream consumers treat both identically; comparisons that must
    /// not distinguish them go through this.
    #[must_use]
    pub fn resolved(&self) -> Self {
        match self {
            Self::Field(key) => Self::Field(key.clone()),
            Self::Unassigned | Self::Skip => Self::Skip,
        }
    }
}

impl From<String> for Assignment {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<&str> for Assignment {
    fn from(value: &str) -> Self {
        Self::from_wire(value)
    }
}

impl From<Assignment> for String {
    fn from(value: Assignment) -> Self {
        value.as_wire().to_string()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => f.write_str("(unassigned)"),
            Self::Skip => f.write_str("(skip)"),
            Self::Field(key) => f.write_str(key),
        }
    }
}
