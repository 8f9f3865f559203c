//! Parsing of the `--set` and `--pick` command-line edits.

use taxmap_model::Assignment;

/// Spelling of [`Assignment::Skip`] on the command line.
pub const SKIP_KEYWORD: &str = "skip";

/// `--set COLUMN=TARGET`: bind a column directly.
///
/// `TARGET` may be a field key, `skip`, or empty to clear the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEdit {
    pub column: String,
    pub assignment: Assignment,
}

/// `--pick TARGET=COLUMN`: resolve a conflicted target in favour of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub target: String,
    pub column: String,
}

pub fn parse_column_edit(raw: &str) -> Result<ColumnEdit, String> {
    let (column, target) = split_pair(raw, "COLUMN=TARGET")?;
    let assignment = if target.eq_ignore_ascii_case(SKIP_KEYWORD) {
        Assignment::Skip
    } else {
        Assignment::from_wire(target)
    };
    Ok(ColumnEdit {
        column: column.to_string(),
        assignment,
    })
}

pub fn parse_pick(raw: &str) -> Result<Pick, String> {
    let (target, column) = split_pair(raw, "TARGET=COLUMN")?;
    if column.is_empty() {
        return Err(format!("missing column in '{raw}', expected TARGET=COLUMN"));
    }
    Ok(Pick {
        target: target.to_string(),
        column: column.to_string(),
    })
}

fn split_pair<'a>(raw: &'a str, shape: &str) -> Result<(&'a str, &'a str), String> {
    let (left, right) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected {shape}, got '{raw}'"))?;
    let left = left.trim();
    if left.is_empty() {
        return Err(format!("empty name in '{raw}', expected {shape}"));
    }
    Ok((left, right.trim()))
}
