//! Formula evaluator
//!
//! Evaluates micro-formula ASTs against a cell source.
//!
//! A term that cannot be resolved does not stop evaluation: its problem is
//! recorded, the sub-expressions above it become absent, and the rest of the
//! tree is still walked so that every bad reference is reported at once.
//! Division by zero and excessive nesting stay fatal.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::ast::{BinaryOperator, MicroExpr, UnaryOperator};
use crate::config::MicroConfig;
use crate::error::{FormulaError, FormulaResult, ResolveError};
use crate::resolver::{CellSource, TermResolver};

/// Result of evaluating one formula
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// The value, absent when any term failed to resolve
    pub value: Option<f64>,
    /// Resolution problems, in source order
    pub errors: Vec<ResolveError>,
}

/// Context for formula evaluation
pub struct EvaluationContext<'a, S: CellSource + ?Sized> {
    resolver: TermResolver<'a, S>,
    max_depth: usize,
}

impl<'a, S: CellSource + ?Sized> EvaluationContext<'a, S> {
    /// Create a context resolving row keys in `key_column` of `source`
    pub fn new(source: &'a S, key_column: &'a str, config: &MicroConfig) -> Self {
        Self {
            resolver: TermResolver::new(source, key_column, config),
            max_depth: config.max_depth,
        }
    }

    /// The resolver used for reference terms
    pub fn resolver(&self) -> &TermResolver<'a, S> {
        &self.resolver
    }
}

/// Round to two decimals, ties to even, on the exact binary value of `x`
///
/// Values outside the decimal range are returned unchanged.
pub fn round_result(x: f64) -> f64 {
    let Some(decimal) = Decimal::from_f64_retain(x) else {
        return x;
    };
    match decimal
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .to_f64()
    {
        // Normalizes -0.0 as well
        Some(r) if r == 0.0 => 0.0,
        Some(r) => r,
        None => x,
    }
}

/// Evaluate a formula expression
pub fn evaluate<S: CellSource + ?Sized>(
    expr: &MicroExpr,
    ctx: &EvaluationContext<'_, S>,
) -> FormulaResult<Evaluation> {
    let mut errors = Vec::new();
    let value = evaluate_expr(expr, ctx, 1, &mut errors)?;
    log::trace!(
        "Evaluated {} to {:?} with {} unresolved term(s)",
        expr,
        value,
        errors.len()
    );
    Ok(Evaluation { value, errors })
}

fn evaluate_expr<S: CellSource + ?Sized>(
    expr: &MicroExpr,
    ctx: &EvaluationContext<'_, S>,
    depth: usize,
    errors: &mut Vec<ResolveError>,
) -> FormulaResult<Option<f64>> {
    if depth > ctx.max_depth {
        return Err(FormulaError::RecursionLimitExceeded {
            limit: ctx.max_depth,
        });
    }

    match expr {
        MicroExpr::Literal(n) => Ok(Some(*n)),

        MicroExpr::Reference(term) => match ctx.resolver.resolve(term) {
            Ok(n) => Ok(Some(n)),
            Err(e) => {
                errors.push(e);
                Ok(None)
            }
        },

        MicroExpr::UnaryOp { op, operand } => {
            let value = evaluate_expr(operand, ctx, depth + 1, errors)?;
            Ok(value.map(|n| evaluate_unary_op(*op, n)))
        }

        MicroExpr::BinaryOp { .. } => evaluate_chain(expr, ctx, depth, errors),
    }
}

/// Evaluate a chain of binary operations
///
/// The left operands are walked in a loop, so a long flat chain stays at
/// one level. Both sides are walked so that every bad term gets reported.
fn evaluate_chain<S: CellSource + ?Sized>(
    expr: &MicroExpr,
    ctx: &EvaluationContext<'_, S>,
    depth: usize,
    errors: &mut Vec<ResolveError>,
) -> FormulaResult<Option<f64>> {
    let mut steps = Vec::new();
    let mut first = expr;
    while let MicroExpr::BinaryOp { op, left, right } = first {
        steps.push((*op, right.as_ref()));
        first = left;
    }

    let mut acc = evaluate_expr(first, ctx, depth, errors)?;
    for (op, right) in steps.into_iter().rev() {
        let right = evaluate_expr(right, ctx, depth + 1, errors)?;
        acc = match (acc, right) {
            (Some(l), Some(r)) => Some(evaluate_binary_op(op, l, r)?),
            _ => None,
        };
    }
    Ok(acc)
}

/// Evaluate a binary operation, rounding the result to two decimals
fn evaluate_binary_op(op: BinaryOperator, left: f64, right: f64) -> FormulaResult<f64> {
    let result = match op {
        BinaryOperator::Add => left + right,
        BinaryOperator::Subtract => left - right,
        BinaryOperator::Multiply => left * right,
        BinaryOperator::Divide => {
            if right == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            left / right
        }
    };
    Ok(round_result(result))
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: UnaryOperator, operand: f64) -> f64 {
    match op {
        UnaryOperator::Plus => operand,
        UnaryOperator::Minus if operand == 0.0 => 0.0,
        UnaryOperator::Minus => -operand,
    }
}
