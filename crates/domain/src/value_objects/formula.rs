//! Attribute formulas like "$strength + $agility / 2".
//!
//! Formulas are parsed once into a small expression tree and interpreted on
//! every evaluation. Supported grammar:
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/') unary)*
//! unary := '-' unary | atom
//! atom  := integer | '$' identifier | '(' expr ')'
//! ```
//!
//! Identifiers are the numeric attribute names (`$strength`, `$healingRate`, ...)
//! and `$level`. Arithmetic runs in floating point and the result is floored
//! once at the end, so "$health / 4" with health 11 yields 2.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{MainAttributes, NumericAttribute, SecondaryAttributes};

/// Error when parsing a formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula string is empty
    #[error("Empty formula")]
    Empty,
    /// A character that cannot start any token
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },
    /// `$name` where name is not an attribute or `level`
    #[error("Unknown identifier in formula: ${0}")]
    UnknownIdentifier(String),
    /// Integer literal that does not fit
    #[error("Invalid number in formula: {0}")]
    InvalidNumber(String),
    /// Token in a position the grammar does not allow
    #[error("Unexpected token in formula: {0}")]
    UnexpectedToken(String),
    /// Input ended in the middle of an expression
    #[error("Unexpected end of formula")]
    UnexpectedEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaVar {
    Attribute(NumericAttribute),
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Parsed formula expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(FormulaVar),
    Neg(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Evaluates the expression. Returns `None` on division by zero.
    fn eval(&self, main: &MainAttributes, level: u32, secondary: &SecondaryAttributes) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            Expr::Var(FormulaVar::Level) => Some(f64::from(level)),
            Expr::Var(FormulaVar::Attribute(attr)) => Some(f64::from(attr.read(main, secondary))),
            Expr::Neg(inner) => inner.eval(main, level, secondary).map(|v| -v),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(main, level, secondary)?;
                let r = rhs.eval(main, level, secondary)?;
                match op {
                    BinaryOp::Add => Some(l + r),
                    BinaryOp::Sub => Some(l - r),
                    BinaryOp::Mul => Some(l * r),
                    BinaryOp::Div if r == 0.0 => None,
                    BinaryOp::Div => Some(l / r),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Var(FormulaVar),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Var(FormulaVar::Level) => write!(f, "$level"),
            Token::Var(FormulaVar::Attribute(attr)) => write!(f, "${}", attr),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, FormulaError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let value: u32 = literal
                    .parse()
                    .map_err(|_| FormulaError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(f64::from(value)));
            }
            '$' => {
                let start = i + 1;
                i = start;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                if name.is_empty() {
                    return Err(FormulaError::UnexpectedChar {
                        ch: '$',
                        position: start - 1,
                    });
                }
                let var = if name == "level" {
                    FormulaVar::Level
                } else {
                    let attr = name
                        .parse::<NumericAttribute>()
                        .map_err(|_| FormulaError::UnknownIdentifier(name.clone()))?;
                    FormulaVar::Attribute(attr)
                };
                tokens.push(Token::Var(var));
            }
            other => {
                return Err(FormulaError::UnexpectedChar {
                    ch: other,
                    position: i,
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(op) = match self.peek() {
            Some(Token::Plus) => Some(BinaryOp::Add),
            Some(Token::Minus) => Some(BinaryOp::Sub),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(op) = match self.peek() {
            Some(Token::Star) => Some(BinaryOp::Mul),
            Some(Token::Slash) => Some(BinaryOp::Div),
            _ => None,
        } {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        if self.peek() == Some(&Token::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Var(var)) => Ok(Expr::Var(var)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(FormulaError::UnexpectedToken(other.to_string())),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some(other) => Err(FormulaError::UnexpectedToken(other.to_string())),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// A parsed attribute formula. Serializes as its source text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    /// Parse a formula string like "$strength + $agility / 2".
    pub fn parse(input: &str) -> Result<Self, FormulaError> {
        let source = input.trim();
        if source.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser {
            tokens: tokenize(source)?,
            pos: 0,
        };
        let expr = parser.expr()?;
        if let Some(extra) = parser.peek() {
            return Err(FormulaError::UnexpectedToken(extra.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    /// Returns the formula text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the parsed expression tree.
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates the formula and floors the result.
    ///
    /// Returns `None` when a division by zero occurs.
    pub fn evaluate(
        &self,
        main: &MainAttributes,
        level: u32,
        secondary: &SecondaryAttributes,
    ) -> Option<i32> {
        self.expr
            .eval(main, level, secondary)
            .map(|value| value.floor() as i32)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Formula {
    type Error = FormulaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Formula> for String {
    fn from(formula: Formula) -> String {
        formula.source
    }
}
