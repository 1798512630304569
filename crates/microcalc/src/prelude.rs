//! Prelude module - common imports for microcalc users
//!
//! ```rust
//! use microcalc::prelude::*;
//! ```

pub use crate::{
    // Batch
    compute_document,
    compute_fields,
    // Formulas
    compute_micro,
    parse_formula,
    BatchError,
    BatchOptions,
    // Cell types
    CellValue,
    // I/O types
    CsvReadOptions,
    CsvReader,
    FieldOutcome,
    FieldsDocument,
    FormulaError,
    MicroConfig,
    Outcome,
    Procedure,
    // Main types
    Table,
};
