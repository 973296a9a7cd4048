//! Restricted arithmetic formulas in one variable, `x`.
//!
//! Used by the function transformer instead of evaluating user input as
//! code: only arithmetic, a fixed set of math functions and `x` exist.

pub mod ast;
pub mod errors;
pub mod parser;

pub use ast::{BinaryOp, Expr, Function, UnaryOp};
pub use errors::FormulaError;

use std::fmt;
use std::str::FromStr;

/// A parsed formula together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            source: source.trim().to_string(),
            expr: parser::parse(source)?,
        })
    }

    pub fn eval(&self, x: f64) -> Result<f64, FormulaError> {
        self.expr.eval(x)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Formula::parse(s)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}
