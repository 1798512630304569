//! # microcalc-formula
//!
//! Micro-formula parser and evaluator for microcalc.
//!
//! A micro-formula is a short arithmetic expression over numbers and cell
//! references such as `sold_debit@401 - (sold_credit@401 + 12.5) / 2`, where a
//! reference names a column and, after the label separator, a row key.
//!
//! This crate provides:
//! - Formula parsing (text → AST), rejecting malformed operator placement
//! - Term resolution against a [`CellSource`]
//! - Evaluation that collects every resolution problem instead of stopping
//!   at the first one
//! - [`compute_micro`], which merges both error channels into one
//!   `(value, error)` pair
//!
//! ## Example
//!
//! ```rust
//! use microcalc_core::{CellValue, Table};
//! use microcalc_formula::{compute_micro, MicroConfig};
//!
//! let mut table = Table::new(["cont", "sold"]).unwrap();
//! table.push_row(vec![CellValue::text("401"), CellValue::Number(10.0)]).unwrap();
//!
//! let outcome = compute_micro(&table, "cont", "sold@401 * 3 + 1", &MicroConfig::default());
//! assert_eq!(outcome.value, Some(31.0));
//! assert_eq!(outcome.error, None);
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod micro;
pub mod parser;
pub mod resolver;

pub use ast::{BinaryOperator, MicroExpr, UnaryOperator};
pub use config::MicroConfig;
pub use error::{FormulaError, FormulaResult, ResolveError};
pub use evaluator::{evaluate, round_result, Evaluation, EvaluationContext};
pub use micro::{compute_micro, Outcome};
pub use parser::parse_formula;
pub use resolver::{CellSource, TermResolver};
