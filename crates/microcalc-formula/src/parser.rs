//! Micro-formula parser
//!
//! A recursive descent parser with the usual arithmetic precedence:
//!
//! ```text
//! expr    := term (("+"|"-") term)*
//! term    := factor (("*"|"/") factor)*
//! factor  := ("+"|"-")? primary
//! primary := TERM | "(" expr ")"
//! ```
//!
//! Misplaced operators are reported with their own error kinds
//! ([`FormulaError::MissingOperand`], [`FormulaError::AdjacentOperators`])
//! rather than as generic parse errors, and nesting is counted so that a
//! hostile formula fails with [`FormulaError::RecursionLimitExceeded`]
//! instead of exhausting the stack.

use crate::ast::{BinaryOperator, MicroExpr, UnaryOperator};
use crate::config::MicroConfig;
use crate::error::{FormulaError, FormulaResult};
use crate::resolver::parse_numeral;

/// Parse a micro-formula into an AST
///
/// Whitespace anywhere in the formula is ignored.
///
/// # Example
/// ```rust
/// use microcalc_formula::{parse_formula, MicroConfig};
///
/// let config = MicroConfig::default();
/// let ast = parse_formula("2 + 3 * 4", &config).unwrap();
/// assert_eq!(ast.to_string(), "(2+(3*4))");
///
/// let ast = parse_formula("-(sold@401 - sold@402) / 2", &config).unwrap();
/// assert_eq!(ast.references(), vec!["sold@401", "sold@402"]);
/// ```
pub fn parse_formula(formula: &str, config: &MicroConfig) -> FormulaResult<MicroExpr> {
    let compact: String = formula.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(FormulaError::Parse("The formula is empty".into()));
    }

    let tokens = tokenize(&compact, config)?;
    let mut parser = MicroParser::new(tokens, config.max_depth);
    let node = parser.parse_expression()?;

    // Make sure we consumed all input
    let rest = parser.current();
    match rest.token {
        Token::Eof => {}
        Token::RightParen => {
            return Err(FormulaError::Parse(format!(
                "Unmatched ')' at position {}",
                rest.position
            )))
        }
        _ => {
            return Err(FormulaError::Parse(format!(
                "Unexpected {} at position {}",
                rest.token.describe(),
                rest.position
            )))
        }
    }

    log::debug!("Parsed formula `{}` as {}", formula, node.expr);
    Ok(node.expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// Number or cell reference
    Term(String),

    // Operators
    Plus,
    Minus,
    Star,
    Slash,

    // Delimiters
    LeftParen,
    RightParen,

    // End of input
    Eof,
}

impl Token {
    fn operator_symbol(&self) -> Option<char> {
        match self {
            Token::Plus => Some('+'),
            Token::Minus => Some('-'),
            Token::Star => Some('*'),
            Token::Slash => Some('/'),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Token::Term(text) => format!("term `{}`", text),
            Token::LeftParen => "'('".into(),
            Token::RightParen => "')'".into(),
            Token::Eof => "end of formula".into(),
            op => format!("operator '{}'", op.operator_symbol().unwrap_or('?')),
        }
    }
}

/// A token and its 1-based character position in the whitespace-free formula
#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    position: usize,
}

/// Characters that always delimit terms, whatever the configuration says
fn is_reserved(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '(' | ')')
}

fn is_term_char(c: char, config: &MicroConfig) -> bool {
    c.is_ascii_alphanumeric()
        || (!is_reserved(c) && (c == config.separator || config.extra_chars.contains(c)))
}

/// Split the formula into tokens. A term starts with an ASCII letter or digit
/// and runs as long as term characters follow.
fn tokenize(input: &str, config: &MicroConfig) -> FormulaResult<Vec<Spanned>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let position = i + 1;
        let token = match chars[i] {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            c if c.is_ascii_alphanumeric() => {
                let start = i;
                while i + 1 < chars.len() && is_term_char(chars[i + 1], config) {
                    i += 1;
                }
                Token::Term(chars[start..=i].iter().collect())
            }
            other => {
                return Err(FormulaError::Parse(format!(
                    "Unexpected character '{}' at position {}",
                    other, position
                )))
            }
        };
        tokens.push(Spanned { token, position });
        i += 1;
    }

    tokens.push(Spanned {
        token: Token::Eof,
        position: chars.len() + 1,
    });
    Ok(tokens)
}

/// A parsed sub-expression together with the height of its tree
struct Node {
    expr: MicroExpr,
    height: usize,
}

/// Formula parser
struct MicroParser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Currently open parentheses
    nesting: usize,
    max_depth: usize,
}

impl MicroParser {
    fn new(tokens: Vec<Spanned>, max_depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            nesting: 0,
            max_depth,
        }
    }

    // === Helper methods ===

    fn current(&self) -> &Spanned {
        // The token list always ends with Eof and we never advance past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn previous(&self) -> Option<&Spanned> {
        self.pos.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    fn advance(&mut self) -> Spanned {
        let token = self.current().clone();
        if !matches!(token.token, Token::Eof) {
            self.pos += 1;
        }
        token
    }

    fn check_height(&self, height: usize) -> FormulaResult<()> {
        if height > self.max_depth {
            return Err(FormulaError::RecursionLimitExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    /// Combine two operands
    ///
    /// The left operand of a chain stays at the chain's level, so only the
    /// right operand adds a level.
    fn join(&self, op: BinaryOperator, left: Node, right: Node) -> FormulaResult<Node> {
        let height = left.height.max(right.height + 1);
        self.check_height(height)?;
        Ok(Node {
            expr: MicroExpr::binary(op, left.expr, right.expr),
            height,
        })
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Sign: +, - (at most one per factor)
    // 4. Primary: terms, parentheses

    fn parse_expression(&mut self) -> FormulaResult<Node> {
        let mut left = self.parse_term()?;

        loop {
            let op = match self.current().token {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_term()?;
            left = self.join(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<Node> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match self.current().token {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_factor()?;
            left = self.join(op, left, right)?;
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> FormulaResult<Node> {
        if !matches!(self.current().token, Token::Plus | Token::Minus) {
            return self.parse_primary();
        }

        let sign = self.advance();
        let symbol = sign.token.operator_symbol().unwrap_or('?');
        let op = UnaryOperator::try_from(symbol)?;

        // Only one sign is allowed, and it needs an operand
        let next = self.current();
        if let Some(second) = next.token.operator_symbol() {
            return Err(FormulaError::AdjacentOperators {
                first: symbol,
                second,
                position: next.position,
            });
        }
        if matches!(next.token, Token::Eof | Token::RightParen) {
            return Err(FormulaError::MissingOperand {
                operator: symbol,
                position: sign.position,
            });
        }

        let operand = self.parse_primary()?;
        let height = operand.height + 1;
        self.check_height(height)?;
        Ok(Node {
            expr: MicroExpr::unary(op, operand.expr),
            height,
        })
    }

    fn parse_primary(&mut self) -> FormulaResult<Node> {
        let current = self.current().clone();

        match current.token {
            Token::Term(text) => {
                self.advance();
                let expr = match parse_numeral(&text) {
                    Some(n) => MicroExpr::Literal(n),
                    None => MicroExpr::Reference(text),
                };
                Ok(Node { expr, height: 1 })
            }

            Token::LeftParen => {
                self.nesting += 1;
                if self.nesting > self.max_depth {
                    return Err(FormulaError::RecursionLimitExceeded {
                        limit: self.max_depth,
                    });
                }
                self.advance();

                if matches!(self.current().token, Token::RightParen) {
                    return Err(FormulaError::Parse(format!(
                        "Empty parentheses at position {}",
                        current.position
                    )));
                }

                let inner = self.parse_expression()?;

                let close = self.current().clone();
                match close.token {
                    Token::RightParen => {
                        self.advance();
                        self.nesting -= 1;
                        Ok(inner)
                    }
                    Token::Eof => Err(FormulaError::Parse(format!(
                        "Missing ')' for the '(' at position {}",
                        current.position
                    ))),
                    _ => Err(FormulaError::Parse(format!(
                        "Unexpected {} at position {}",
                        close.token.describe(),
                        close.position
                    ))),
                }
            }

            Token::Plus | Token::Minus | Token::Star | Token::Slash => {
                let symbol = current.token.operator_symbol().unwrap_or('?');
                match self.previous().and_then(|p| p.token.operator_symbol()) {
                    Some(first) => Err(FormulaError::AdjacentOperators {
                        first,
                        second: symbol,
                        position: current.position,
                    }),
                    // Start of the formula or of a parenthesized group
                    None => Err(FormulaError::MissingOperand {
                        operator: symbol,
                        position: current.position,
                    }),
                }
            }

            Token::RightParen | Token::Eof => {
                let previous = self.previous().cloned();
                match previous {
                    Some(prev) if prev.token.operator_symbol().is_some() => {
                        Err(FormulaError::MissingOperand {
                            operator: prev.token.operator_symbol().unwrap_or('?'),
                            position: prev.position,
                        })
                    }
                    _ => Err(FormulaError::Parse(format!(
                        "Unexpected {} at position {}",
                        current.token.describe(),
                        current.position
                    ))),
                }
            }
        }
    }
}
