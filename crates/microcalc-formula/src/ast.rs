//! Micro-formula Abstract Syntax Tree types

use std::fmt;

use crate::error::{FormulaError, FormulaResult};

/// Micro-formula expression AST
///
/// Parentheses leave no node behind: `(a+b)*c` and `a+b` share the shape of
/// their `a+b` part.
#[derive(Debug, Clone, PartialEq)]
pub enum MicroExpr {
    /// Numeric literal
    Literal(f64),
    /// Reference term, resolved against the table at evaluation time
    Reference(String),
    /// Sign applied to one operand
    UnaryOp {
        op: UnaryOperator,
        operand: Box<MicroExpr>,
    },
    /// Arithmetic on two operands
    BinaryOp {
        op: BinaryOperator,
        left: Box<MicroExpr>,
        right: Box<MicroExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl MicroExpr {
    /// Build a unary node
    pub fn unary(op: UnaryOperator, operand: MicroExpr) -> Self {
        MicroExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    /// Build a binary node
    pub fn binary(op: BinaryOperator, left: MicroExpr, right: MicroExpr) -> Self {
        MicroExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Reference terms in source order
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        let mut stack = vec![self];

        while let Some(expr) = stack.pop() {
            match expr {
                MicroExpr::Literal(_) => {}
                MicroExpr::Reference(term) => refs.push(term.as_str()),
                MicroExpr::UnaryOp { operand, .. } => stack.push(operand),
                MicroExpr::BinaryOp { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        refs
    }
}

impl BinaryOperator {
    /// Operator symbol
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
        }
    }
}

impl TryFrom<char> for BinaryOperator {
    type Error = FormulaError;

    fn try_from(c: char) -> FormulaResult<Self> {
        match c {
            '+' => Ok(BinaryOperator::Add),
            '-' => Ok(BinaryOperator::Subtract),
            '*' => Ok(BinaryOperator::Multiply),
            '/' => Ok(BinaryOperator::Divide),
            other => Err(FormulaError::Parse(format!("Unknown operator '{}'", other))),
        }
    }
}

impl UnaryOperator {
    /// Operator symbol
    pub fn symbol(self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Minus => '-',
        }
    }
}

impl TryFrom<char> for UnaryOperator {
    type Error = FormulaError;

    fn try_from(c: char) -> FormulaResult<Self> {
        match c {
            '+' => Ok(UnaryOperator::Plus),
            '-' => Ok(UnaryOperator::Minus),
            other => Err(FormulaError::InvalidUnaryOperator(other)),
        }
    }
}

/// Canonical rendering: every binary node is parenthesized, so the output
/// parses back into the same tree.
impl fmt::Display for MicroExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MicroExpr::Literal(n) => write!(f, "{}", n),
            MicroExpr::Reference(term) => f.write_str(term),
            MicroExpr::UnaryOp { op, operand } => match operand.as_ref() {
                // A sign directly followed by a sign would not parse back
                MicroExpr::UnaryOp { .. } => write!(f, "{}({})", op.symbol(), operand),
                _ => write!(f, "{}{}", op.symbol(), operand),
            },
            MicroExpr::BinaryOp { op, left, right } => {
                write!(f, "({}{}{})", left, op.symbol(), right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reference(term: &str) -> MicroExpr {
        MicroExpr::Reference(term.to_string())
    }

    #[test]
    fn test_operator_from_char() {
        assert_eq!(BinaryOperator::try_from('/'), Ok(BinaryOperator::Divide));
        assert!(matches!(
            BinaryOperator::try_from('^'),
            Err(FormulaError::Parse(_))
        ));

        assert_eq!(UnaryOperator::try_from('-'), Ok(UnaryOperator::Minus));
        assert_eq!(
            UnaryOperator::try_from('*'),
            Err(FormulaError::InvalidUnaryOperator('*'))
        );
    }

    #[test]
    fn test_references_in_source_order() {
        // a@1 * (b@2 - -c@3) + 4
        let expr = MicroExpr::binary(
            BinaryOperator::Add,
            MicroExpr::binary(
                BinaryOperator::Multiply,
                reference("a@1"),
                MicroExpr::binary(
                    BinaryOperator::Subtract,
                    reference("b@2"),
                    MicroExpr::unary(UnaryOperator::Minus, reference("c@3")),
                ),
            ),
            MicroExpr::Literal(4.0),
        );
        assert_eq!(expr.references(), vec!["a@1", "b@2", "c@3"]);
    }

    #[test]
    fn test_display() {
        let expr = MicroExpr::binary(
            BinaryOperator::Divide,
            MicroExpr::unary(UnaryOperator::Minus, reference("a@1")),
            MicroExpr::Literal(2.5),
        );
        assert_eq!(expr.to_string(), "(-a@1/2.5)");

        let nested = MicroExpr::unary(
            UnaryOperator::Minus,
            MicroExpr::unary(UnaryOperator::Plus, MicroExpr::Literal(3.0)),
        );
        assert_eq!(nested.to_string(), "-(+3)");
    }
}
