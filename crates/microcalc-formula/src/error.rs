//! Formula error types
//!
//! Two channels are kept apart:
//! - [`FormulaError`] is fatal. It aborts the formula and no value is produced.
//! - [`ResolveError`] is soft. The evaluator records it, marks the affected
//!   sub-expression as absent and keeps evaluating the rest of the tree.

use microcalc_core::{CellValue, Missing};
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Fatal errors raised while parsing or evaluating a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The text does not match the grammar
    #[error("Parse error: {0}")]
    Parse(String),

    /// A binary operator lacks its left or right operand
    #[error(
        "The operator '{operator}' at position {position} is misplaced. An operator must have \
         a cell reference or a numeric value both on its left and on its right"
    )]
    MissingOperand { operator: char, position: usize },

    /// Two operators follow each other with no operand in between
    #[error(
        "The formula contains two arithmetic operators next to each other ('{first}{second}' at \
         position {position}). An operator must have a cell reference or a numeric value both \
         on its left and on its right"
    )]
    AdjacentOperators {
        first: char,
        second: char,
        position: usize,
    },

    /// A unary node carries something other than `+` or `-`
    #[error("'{0}' cannot be used as a sign. Only '+' and '-' may precede a term")]
    InvalidUnaryOperator(char),

    /// The formula nests deeper than the configured limit
    #[error(
        "The formula is nested too deeply (more than {limit} levels). It must contain a \
         reasonable number of parentheses, operators and terms"
    )]
    RecursionLimitExceeded { limit: usize },

    /// Division by a right operand that is exactly zero
    #[error(
        "The formula divides by zero, either explicitly or because the denominator refers to a \
         cell whose value is zero"
    )]
    DivisionByZero,
}

/// Soft errors raised while resolving a single term
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The term is not a number and contains no label separator
    #[error(
        "The term `{term}` is neither a number nor a cell reference of the form \
         `column{separator}row`"
    )]
    MalformedReference { term: String, separator: char },

    /// The column or the row key does not exist in the table
    #[error("The cell reference `{term}` cannot be resolved: {missing}")]
    UnresolvedReference { term: String, missing: Missing },

    /// The referenced cell is empty or does not hold a number
    #[error("{}", describe_cell(.term, .content))]
    NonNumericCell { term: String, content: CellValue },
}

fn describe_cell(term: &str, content: &CellValue) -> String {
    match content {
        CellValue::Empty => format!("The cell referenced by `{term}` is empty"),
        other => format!("The cell referenced by `{term}` is not numeric (`{other}`)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_numeric_messages() {
        let empty = ResolveError::NonNumericCell {
            term: "sold@401".into(),
            content: CellValue::Empty,
        };
        assert_eq!(empty.to_string(), "The cell referenced by `sold@401` is empty");

        let text = ResolveError::NonNumericCell {
            term: "sold@401".into(),
            content: CellValue::text("abc"),
        };
        assert_eq!(
            text.to_string(),
            "The cell referenced by `sold@401` is not numeric (`abc`)"
        );
    }

    #[test]
    fn test_unresolved_message() {
        let err = ResolveError::UnresolvedReference {
            term: "sold@9".into(),
            missing: Missing::Key {
                key: "9".into(),
                key_column: "cont".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "The cell reference `sold@9` cannot be resolved: row key `9` does not exist in column `cont`"
        );
    }
}
