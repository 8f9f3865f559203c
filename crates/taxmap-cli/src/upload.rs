//! Reading an uploaded CSV into sample data.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use tracing::{debug, trace};

use taxmap_model::{SampleData, SampleRow};

use crate::logging::redact_value;

/// Rows kept from an upload when `--sample-rows` is not given.
pub const DEFAULT_SAMPLE_ROWS: usize = 20;

pub fn read_upload(path: &Path, max_rows: usize) -> Result<SampleData> {
    let file = File::open(path).with_context(|| format!("open upload: {}", path.display()))?;
    parse_upload(file, max_rows).with_context(|| format!("read upload: {}", path.display()))
}

/// Header plus the first `max_rows` non-blank rows.
///
/// Short rows are padded with empty cells; extra cells beyond the header
/// are dropped.
pub fn parse_upload<R: Read>(reader: R, max_rows: usize) -> Result<SampleData> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let columns: Vec<String> = reader
        .headers()
        .context("read header row")?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        if rows.len() >= max_rows {
            break;
        }
        let record = record.with_context(|| format!("read record {}", index + 1))?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let row: SampleRow = columns
            .iter()
            .enumerate()
            .map(|(i, column)| (column.clone(), record.get(i).unwrap_or_default().to_string()))
            .collect();
        trace!(
            row = index + 1,
            values = ?row.values().map(|v| redact_value(v)).collect::<Vec<_>>(),
            "sample row"
        );
        rows.push(row);
    }

    let samples = SampleData::new(columns, rows).context("invalid header row")?;
    debug!(
        columns = samples.columns().len(),
        rows = samples.rows().len(),
        "upload read"
    );
    Ok(samples)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}
