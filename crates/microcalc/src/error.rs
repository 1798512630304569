//! Batch error types
//!
//! Every variant is a global failure: it replaces the whole result list with
//! a single `global_error` entry. Per-field problems never surface here.

use microcalc_csv::CsvError;
use thiserror::Error;

/// Result type for batch operations
pub type BatchResult<T> = std::result::Result<T, BatchError>;

/// Failures that prevent computing any field
#[derive(Debug, Error)]
pub enum BatchError {
    /// The fields file does not exist
    #[error("The field definitions could not be found")]
    FieldsNotFound(#[source] std::io::Error),

    /// The fields file exists but could not be read
    #[error("The field definitions could not be read: {0}")]
    FieldsUnreadable(#[source] std::io::Error),

    /// The fields file is not valid JSON
    #[error("An error occurred while reading the field definitions: {0}")]
    InvalidFieldsJson(#[from] serde_json::Error),

    /// The fields document is not an object, or has no entries
    #[error(
        "No fields have been defined for this report. If that is not the case, the field \
         definitions are malformed (expected a non-empty JSON object)"
    )]
    NoFields,

    /// The data file extension is not supported
    #[error(
        "The uploaded file is not in a supported format ({0}). To be processed, the file must \
         have the .csv extension"
    )]
    UnsupportedFormat(String),

    /// The data file could not be read
    #[error(
        "The uploaded file cannot be read. Export the data again from the original database \
         and upload it again ({0})"
    )]
    DataUnreadable(#[source] CsvError),

    /// The data file has no columns or no rows
    #[error("The data in the uploaded file does not have at least one row and one column")]
    EmptyTable,

    /// A procedure maps to something other than a non-empty list
    #[error(
        "The settings of the fields computed with `{0}` are missing or are not a non-empty list"
    )]
    InvalidProcedure(String),

    /// A field entry is not a JSON object
    #[error("Some field settings of `{0}` are not in the format required for calculation (object expected)")]
    FieldNotObject(String),

    /// A field entry lacks a required key
    #[error("Some field settings of `{procedure}` lack the required key `{key}`")]
    MissingKey { procedure: String, key: &'static str },

    /// A field entry holds a non-string value where a string is required
    #[error("Some field settings of `{procedure}` hold a non-string value for `{key}` (string expected)")]
    NotAString { procedure: String, key: &'static str },
}

impl From<CsvError> for BatchError {
    fn from(err: CsvError) -> Self {
        match err {
            CsvError::Empty => BatchError::EmptyTable,
            CsvError::UnsupportedFormat(format) => BatchError::UnsupportedFormat(format),
            other => BatchError::DataUnreadable(other),
        }
    }
}
