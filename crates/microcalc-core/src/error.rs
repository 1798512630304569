//! Error types for microcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a [`Table`](crate::Table)
#[derive(Debug, Error)]
pub enum Error {
    /// The header declares no columns at all
    #[error("A table needs at least one column")]
    NoColumns,

    /// Two header cells share the same name
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// A row is wider than the header
    #[error("Row {row} has {actual} cells but the table has {expected} columns")]
    RowTooWide {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
