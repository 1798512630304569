//! Term resolution
//!
//! Turns a single term of a formula into a number: either the term is a
//! numeral, or it is a `column<separator>key` reference looked up in a
//! [`CellSource`].

use microcalc_core::{CellLookup, CellValue, Table};

use crate::config::MicroConfig;
use crate::error::ResolveError;

/// Anything that can answer `(column, key column, key)` lookups
pub trait CellSource {
    /// Check if a column with this name exists
    fn has_column(&self, name: &str) -> bool;

    /// Look up the cell in `column` on the row whose `key_column` holds `key`
    fn lookup(&self, column: &str, key_column: &str, key: &str) -> CellLookup<'_>;
}

impl CellSource for Table {
    fn has_column(&self, name: &str) -> bool {
        Table::has_column(self, name)
    }

    fn lookup(&self, column: &str, key_column: &str, key: &str) -> CellLookup<'_> {
        Table::lookup(self, column, key_column, key)
    }
}

/// Parse a term made only of ASCII digits with at most one decimal point
pub fn parse_numeral(term: &str) -> Option<f64> {
    let mut digits = 0;
    let mut dots = 0;
    for c in term.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }
    if digits == 0 || dots > 1 {
        return None;
    }
    term.parse().ok()
}

/// Resolves terms against one key column of a cell source
pub struct TermResolver<'a, S: CellSource + ?Sized> {
    source: &'a S,
    key_column: &'a str,
    separator: char,
    strict: bool,
}

impl<'a, S: CellSource + ?Sized> TermResolver<'a, S> {
    /// Create a resolver using the separator and strictness of `config`
    pub fn new(source: &'a S, key_column: &'a str, config: &MicroConfig) -> Self {
        Self {
            source,
            key_column,
            separator: config.separator,
            strict: config.strict,
        }
    }

    /// The key column row keys are looked up in
    pub fn key_column(&self) -> &str {
        self.key_column
    }

    /// Resolve a term to its numeric value
    pub fn resolve(&self, term: &str) -> Result<f64, ResolveError> {
        if let Some(n) = parse_numeral(term) {
            return Ok(n);
        }

        let Some((column, key)) = term.split_once(self.separator) else {
            return Err(ResolveError::MalformedReference {
                term: term.to_string(),
                separator: self.separator,
            });
        };

        let cell = match self.source.lookup(column, self.key_column, key) {
            CellLookup::Found(cell) => cell,
            CellLookup::NotFound(missing) => {
                return Err(ResolveError::UnresolvedReference {
                    term: term.to_string(),
                    missing,
                })
            }
        };

        match cell {
            CellValue::Number(n) if !n.is_nan() => Ok(*n),
            CellValue::Empty | CellValue::Number(_) if !self.strict => {
                log::trace!("Empty cell `{}` counted as zero", term);
                Ok(0.0)
            }
            CellValue::Number(_) => Err(ResolveError::NonNumericCell {
                term: term.to_string(),
                content: CellValue::Empty,
            }),
            other => Err(ResolveError::NonNumericCell {
                term: term.to_string(),
                content: other.clone(),
            }),
        }
    }
}
