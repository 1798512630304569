//! # microcalc-core
//!
//! Core data structures for the microcalc formula engine.
//!
//! This crate provides the fundamental types used throughout microcalc:
//! - [`CellValue`] - Represents cell values (numbers, text, empty cells)
//! - [`Table`] - A read-only, column-indexed row store with keyed lookups
//! - [`CellLookup`] and [`Missing`] - The outcome of a `(column, row key)` lookup
//!
//! ## Example
//!
//! ```rust
//! use microcalc_core::{CellLookup, CellValue, Table};
//!
//! let mut table = Table::new(["account", "debit"]).unwrap();
//! table.push_row(vec![CellValue::text("401"), CellValue::Number(120.5)]).unwrap();
//!
//! match table.lookup("debit", "account", "401") {
//!     CellLookup::Found(value) => assert_eq!(value.as_number(), Some(120.5)),
//!     CellLookup::NotFound(missing) => panic!("{missing}"),
//! }
//! ```

pub mod cell;
pub mod error;
pub mod table;

pub use cell::CellValue;
pub use error::{Error, Result};
pub use table::{CellLookup, Missing, Table};
