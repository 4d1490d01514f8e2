//! Abstract Syntax Tree (AST) representation
//!
//! Natural-language phrases are desugared by the parser into ordinary
//! `Binary` / `FunctionCall` nodes, so no phrase-specific cases survive here.
//! Date keywords are kept as [`DateSpec`] and resolved when evaluated.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Function call arguments, in call order.
pub type Arguments = Vec<Expression>;

/// AST node for one calculator line
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `42`, `3.5`
    NumberLiteral(f64),
    /// `5 km`, `20°C`, `3 km/h`
    UnitLiteral { value: f64, unit: String },
    /// `$100`, `100 €`; `code` is the symbol or code as written
    CurrencyLiteral { value: f64, code: String },
    DateLiteral(DateSpec),
    /// `14:30` - today at that time
    TimeLiteral(NaiveTime),
    /// `"quoted"` - only meaningful as a `print` template
    TextLiteral(String),
    Identifier(String),
    /// `name = expr`
    Assignment {
        name: String,
        expression: Box<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        operator: UnaryOperator,
        expression: Box<Expression>,
    },
    FunctionCall { name: String, arguments: Arguments },
    /// `expr in unit`
    Conversion {
        expression: Box<Expression>,
        target: String,
    },
    PreviousReference(PreviousReference),
    /// `:name arg arg` - never evaluated arithmetically
    Command { name: String, arguments: Vec<String> },
    /// Empty or comment-only line
    NoOp,
}

impl Expression {
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(operator: UnaryOperator, expression: Expression) -> Self {
        Expression::Unary {
            operator,
            expression: Box::new(expression),
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, Expression::Assignment { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// `%`: remainder for numbers, "X percent of Y" when the left side is a percentage
    Remainder,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Remainder => "%",
        };
        f.write_str(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    /// Postfix `%`: `20%`
    Percent,
}

/// Which earlier line a `prev` reference names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviousReference {
    /// `prev`
    Latest,
    /// `prev~N`, `prev~` (N = 1)
    RelativeBack(u64),
    /// `prev#N`
    AbsoluteLine(u64),
}

/// A date that may depend on the clock at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    Now,
    Today,
    Tomorrow,
    Yesterday,
    On(NaiveDate),
    At(NaiveDateTime),
}
