//! One-call formula computation
//!
//! [`compute_micro`] parses, evaluates and folds both error channels into a
//! single [`Outcome`], which is what a field calculator reports.

use crate::config::MicroConfig;
use crate::error::FormulaError;
use crate::evaluator::{evaluate, EvaluationContext};
use crate::parser::parse_formula;
use crate::resolver::CellSource;

/// Value or error text of one computed formula
///
/// Exactly one of the two is present.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub value: Option<f64>,
    pub error: Option<String>,
}

impl Outcome {
    /// A computed value
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A failure message
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            value: None,
            error: Some(message.into()),
        }
    }

    /// Check if a value was computed
    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

/// Parse and evaluate `formula`, looking row keys up in `key_column`
pub fn compute_micro<S: CellSource + ?Sized>(
    source: &S,
    key_column: &str,
    formula: &str,
    config: &MicroConfig,
) -> Outcome {
    let ast = match parse_formula(formula, config) {
        Ok(ast) => ast,
        Err(FormulaError::Parse(msg)) => {
            log::debug!("Formula `{}` does not parse: {}", formula, msg);
            return Outcome::error(format!("The formula could not be parsed: {}", msg));
        }
        Err(e) => {
            log::debug!("Formula `{}` rejected: {}", formula, e);
            return Outcome::error(e.to_string());
        }
    };

    let ctx = EvaluationContext::new(source, key_column, config);
    match evaluate(&ast, &ctx) {
        Ok(evaluation) => match evaluation.value {
            Some(value) if evaluation.errors.is_empty() => {
                log::debug!("Formula `{}` = {}", formula, value);
                Outcome::value(value)
            }
            _ => {
                let messages: Vec<String> =
                    evaluation.errors.iter().map(ToString::to_string).collect();
                log::debug!(
                    "Formula `{}` has {} unresolved term(s)",
                    formula,
                    messages.len()
                );
                Outcome::error(messages.join("\n"))
            }
        },
        Err(e) => {
            log::debug!("Formula `{}` failed: {}", formula, e);
            Outcome::error(e.to_string())
        }
    }
}
