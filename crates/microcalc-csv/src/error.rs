//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while reading a data file
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] microcalc_core::Error),

    /// The file has no header or no data rows
    #[error("The data file must contain at least one column and one row")]
    Empty,

    /// The file extension is not one we can read
    #[error("Unsupported data file format `{0}`; expected a .csv file")]
    UnsupportedFormat(String),
}
