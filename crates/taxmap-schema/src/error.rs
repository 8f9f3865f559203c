//! Error types for schema loading operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading target schemas.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// Failed to read a schema file from disk.
    #[error("Failed to read schema file {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row of schema CSV could not be parsed.
    #[error("Failed to parse {file}: {message}")]
    CsvParse { file: String, message: String },

    /// The same field key appears twice for one report type.
    #[error("Duplicate field '{key}' in report type '{report_type}'")]
    DuplicateField { report_type: String, key: String },

    /// No schema is defined for the requested report type.
    #[error("Unknown report type: {0}")]
    UnknownReportType(String),
}

/// Result type for schema loading operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
