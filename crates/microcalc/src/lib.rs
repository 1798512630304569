//! # microcalc
//!
//! Compute report fields from tabular accounting data.
//!
//! A fields document lists, per procedure, the fields to compute. Fields are
//! either fixed-shape lookups (one cell, a sum over several rows, the
//! difference of two cells) or micro-formulas such as
//! `sold_debit@401 - sold_credit@401`, evaluated against a data table loaded
//! from a CSV file.
//!
//! ## Features
//!
//! - Micro-formula parsing and evaluation with precise error reporting
//! - CSV loading with delimiter detection and typed cells
//! - Independent per-field outcomes; one bad field never stops the batch
//!
//! ## Example
//!
//! ```rust
//! use microcalc::prelude::*;
//!
//! let mut table = Table::new(["cont", "sold"]).unwrap();
//! table.push_row(vec![CellValue::text("401"), CellValue::Number(1250.5)]).unwrap();
//! table.push_row(vec![CellValue::text("402"), CellValue::Number(250.5)]).unwrap();
//!
//! let document: FieldsDocument = r#"{
//!     "micro_calc": [{"id": 1, "account_col_name": "cont", "micro_formula": "sold@401 - sold@402"}]
//! }"#.parse().unwrap();
//!
//! let outcomes = compute_document(&table, &document, &BatchOptions::default()).unwrap();
//! assert_eq!(
//!     serde_json::to_string(&outcomes).unwrap(),
//!     r#"[{"id":1,"value":1000.0,"error":null}]"#
//! );
//! ```

pub mod batch;
pub mod calculators;
pub mod error;
pub mod fields;
pub mod prelude;

// Re-export batch types
pub use batch::{
    compute_document, compute_field, compute_fields, compute_group, open_table,
    try_compute_fields, BatchOptions, FieldOutcome,
};
pub use error::{BatchError, BatchResult};
pub use fields::{FieldGroup, FieldParams, FieldSpec, FieldsDocument, Procedure};

// Re-export core types
pub use microcalc_core::{CellLookup, CellValue, Error, Missing, Result, Table};

// Re-export formula types
pub use microcalc_formula::{
    compute_micro, evaluate, parse_formula, round_result, EvaluationContext, FormulaError,
    FormulaResult, MicroConfig, MicroExpr, Outcome, ResolveError,
};

// Re-export I/O types
pub use microcalc_csv::{read_table, CsvError, CsvReadOptions, CsvReader};
