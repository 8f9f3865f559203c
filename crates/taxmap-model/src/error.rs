use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// Upload header contained a blank column name.
    #[error("column {index} has an empty name")]
    EmptyColumnName { index: usize },

    /// Upload header contained the same column name twice.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
