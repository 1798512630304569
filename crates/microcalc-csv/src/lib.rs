//! # microcalc-csv
//!
//! CSV reader for microcalc.
//!
//! Reads a delimited text file into a [`Table`](microcalc_core::Table): the
//! first row is the header, the remaining rows are typed cells.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::{read_table, CsvReader};
