//! CSV-backed schema loading.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;
use std::path::Path;

use serde::Deserialize;

use taxmap_model::{TargetField, TargetSchema};

use crate::embedded;
use crate::error::{Result, SchemaError};

/// Load every built-in report schema, sorted by report type.
///
/// # Example
///
/// ```rust,ignore
/// let schemas = taxmap_schema::load()?;
/// let vat = schemas.iter().find(|s| s.report_type == "vat_return").unwrap();
/// println!("VAT return has {} fields", vat.fields.len());
/// ```
pub fn load() -> Result<Vec<TargetSchema>> {
    load_from_str(embedded::TARGET_FIELDS, "target_fields.csv")
}

/// Built-in schema for a single report type.
pub fn schema_for(report_type: &str) -> Result<TargetSchema> {
    find_schema(load()?, report_type)
}

/// Load schemas from an override CSV file.
pub fn load_from_path(path: &Path) -> Result<Vec<TargetSchema>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| SchemaError::CsvRead {
            path: path.to_path_buf(),
            source,
        })?;
    let file = path.display().to_string();
    read_schemas(reader, &file)
}

/// Load schemas from CSV text. `file` names the source in error messages.
pub fn load_from_str(content: &str, file: &str) -> Result<Vec<TargetSchema>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(Cursor::new(content.as_bytes()));
    read_schemas(reader, file)
}

/// Pick one report type out of a loaded set.
pub fn find_schema(schemas: Vec<TargetSchema>, report_type: &str) -> Result<TargetSchema> {
    let wanted = normalize_report_type(report_type);
    schemas
        .into_iter()
        .find(|s| s.report_type == wanted)
        .ok_or_else(|| SchemaError::UnknownReportType(report_type.to_string()))
}

// =============================================================================
// CSV Row Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct FieldCsvRow {
    #[serde(rename = "Report Type")]
    report_type: String,
    #[serde(rename = "Field Order")]
    field_order: String,
    #[serde(rename = "Field Key")]
    field_key: String,
    #[serde(rename = "Field Label")]
    field_label: String,
    #[serde(rename = "Group", default)]
    group: String,
}

struct OrderedField {
    order: Option<u32>,
    field: TargetField,
}

fn read_schemas<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    file: &str,
) -> Result<Vec<TargetSchema>> {
    let mut grouped: BTreeMap<String, Vec<OrderedField>> = BTreeMap::new();
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();

    for result in reader.deserialize::<FieldCsvRow>() {
        let row = result.map_err(|e| SchemaError::CsvParse {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        let report_type = normalize_report_type(&row.report_type);
        let key = row.field_key.trim().to_string();
        if report_type.is_empty() || key.is_empty() {
            continue;
        }
        if !seen.insert((report_type.clone(), key.clone())) {
            return Err(SchemaError::DuplicateField { report_type, key });
        }

        let label = non_empty(&row.field_label).unwrap_or_else(|| key.clone());
        let mut field = TargetField::new(key, label);
        field.group = non_empty(&row.group);

        grouped.entry(report_type).or_default().push(OrderedField {
            order: row.field_order.trim().parse::<u32>().ok(),
            field,
        });
    }

    Ok(grouped
        .into_iter()
        .map(|(report_type, mut fields)| {
            fields.sort_by(compare_field_order);
            TargetSchema::new(report_type, fields.into_iter().map(|f| f.field).collect())
        })
        .collect())
}

// =============================================================================
// Helpers
// =============================================================================

fn normalize_report_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Return Some(value) if non-empty, None otherwise.
fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Compare fields by order (nulls last, then by key).
fn compare_field_order(left: &OrderedField, right: &OrderedField) -> std::cmp::Ordering {
    match (left.order, right.order) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => left.field.key.cmp(&right.field.key),
    }
}
