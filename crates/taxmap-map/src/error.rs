//! Error types for mapping operations.

use thiserror::Error;

/// Failure reported by one of the external collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    /// The service could not be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The service answered with an error status.
    #[error("service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response payload could not be decoded.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Local storage backing a collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from mapping operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// Proceeding while target fields are still claimed by several columns.
    #[error("{count} target field(s) are mapped from more than one column")]
    UnresolvedConflicts { count: usize },

    /// Confirming a mapping that binds no column to a target field.
    #[error("no column is mapped to a target field")]
    NothingMapped,

    /// The suggestion service failed; the assignment was left untouched.
    #[error("mapping suggestion failed: {0}")]
    SuggestionFailed(#[source] ServiceError),

    /// Column not present in the upload.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Disambiguation requested for a field nobody is fighting over.
    #[error("Target field '{0}' has no conflict to resolve")]
    NotConflicted(String),

    /// Resolve or inspect called while no field is open for disambiguation.
    #[error("no target field is open for disambiguation")]
    NoDisambiguationOpen,

    /// The chosen winner is not currently assigned to the open field.
    #[error("Column '{column}' is not competing for '{target}'")]
    NotAContender { column: String, target: String },
}

impl MappingError {
    /// Message suitable for showing to the person doing the mapping.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnresolvedConflicts { count } => {
                let noun = if *count == 1 { "field is" } else { "fields are" };
                format!(
                    "{count} target {noun} assigned to more than one column. \
                     Resolve the conflicts before continuing."
                )
            }
            Self::NothingMapped => {
                "Map at least one column to a field before confirming.".to_string()
            }
            Self::SuggestionFailed(_) => {
                "Automatic mapping is unavailable right now. Your current mapping was kept; \
                 try again or map the columns manually."
                    .to_string()
            }
            Self::ColumnNotFound(column) => {
                format!("The column '{column}' is not part of this upload.")
            }
            Self::NotConflicted(target) => {
                format!("'{target}' is not assigned to more than one column.")
            }
            Self::NoDisambiguationOpen => "Select a conflicting field first.".to_string(),
            Self::NotAContender { column, target } => {
                format!("'{column}' is not one of the columns mapped to '{target}'.")
            }
        }
    }

    /// The column associated with this error, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::ColumnNotFound(c) => Some(c),
            Self::NotAContender { column, .. } => Some(column),
            _ => None,
        }
    }

    /// True for local validation rejections (no service was contacted).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::UnresolvedConflicts { .. } | Self::NothingMapped)
    }
}

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
