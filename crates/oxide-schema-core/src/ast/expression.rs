//! Expression AST types.
//!
//! Expressions appear in `CHECK` constraints, `DEFAULT (...)` clauses and generated columns.
//! Rendering with [`fmt::Display`] produces SQL that parses back into an equal tree: operands
//! are parenthesized only where SQLite's operator precedence would otherwise regroup them.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::quote_identifier;
use crate::schema::SqlType;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Blob literal.
    Blob(Vec<u8>),
    /// Boolean literal (`TRUE`/`FALSE`).
    Boolean(bool),
    /// NULL literal.
    Null,
    /// `CURRENT_TIME`
    CurrentTime,
    /// `CURRENT_DATE`
    CurrentDate,
    /// `CURRENT_TIMESTAMP`
    CurrentTimestamp,
}

impl Literal {
    /// Returns true for a string literal equal to `''`.
    #[must_use]
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
            Self::Boolean(true) => f.write_str("TRUE"),
            Self::Boolean(false) => f.write_str("FALSE"),
            Self::Null => f.write_str("NULL"),
            Self::CurrentTime => f.write_str("CURRENT_TIME"),
            Self::CurrentDate => f.write_str("CURRENT_DATE"),
            Self::CurrentTimestamp => f.write_str("CURRENT_TIMESTAMP"),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
    NotLike,
    Glob,
    NotGlob,

    // Logical
    And,
    Or,

    // String
    Concat,

    // Bitwise
    BitAnd,
    BitOr,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Glob => "GLOB",
            Self::NotGlob => "NOT GLOB",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Concat => "||",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    ///
    /// Levels follow SQLite: `||` binds tightest and `OR` loosest.
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq
            | Self::NotEq
            | Self::Is
            | Self::IsNot
            | Self::In
            | Self::NotIn
            | Self::Like
            | Self::NotLike
            | Self::Glob
            | Self::NotGlob => EQUALITY_PRECEDENCE,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 5,
            Self::BitAnd | Self::BitOr | Self::LeftShift | Self::RightShift => 6,
            Self::Add | Self::Sub => 7,
            Self::Mul | Self::Div | Self::Mod => 8,
            Self::Concat => 9,
        }
    }
}

/// Precedence of `NOT`.
const NOT_PRECEDENCE: u8 = 3;
/// Precedence shared by `=`, `IS`, `IN`, `LIKE`, `GLOB` and `BETWEEN`.
const EQUALITY_PRECEDENCE: u8 = 4;
/// Precedence of `COLLATE`.
const COLLATE_PRECEDENCE: u8 = 10;
/// Precedence of unary `-`, `+` and `~`.
const UNARY_PRECEDENCE: u8 = 11;
/// Precedence of literals, identifiers, calls and lists.
const PRIMARY_PRECEDENCE: u8 = 12;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,
    /// Unary plus (+)
    Plus,
    /// Logical NOT
    Not,
    /// Bitwise NOT (~)
    BitNot,
}

impl UnaryOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "NOT",
            Self::BitNot => "~",
        }
    }

    const fn precedence(self) -> u8 {
        match self {
            Self::Not => NOT_PRECEDENCE,
            Self::Neg | Self::Plus | Self::BitNot => UNARY_PRECEDENCE,
        }
    }
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// The function name, as written.
    pub name: String,
    /// The arguments.
    pub args: Vec<Expr>,
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Literal value.
    Literal(Literal),
    /// Column reference.
    Identifier(String),
    /// Binary operation. The right operand of `IN` is an [`Expr::List`].
    Infix {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Parenthesized, comma-separated list of expressions.
    List(Vec<Expr>),
    /// Function call.
    Function(FunctionCall),
    /// `expr [NOT] BETWEEN low AND high`
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
        /// Whether NOT was specified.
        negated: bool,
    },
    /// `expr COLLATE collation`
    Collate {
        /// Collated expression.
        expr: Box<Expr>,
        /// Collation name.
        collation: String,
    },
    /// `expr [NOT] LIKE pattern ESCAPE escape`. A `LIKE` without `ESCAPE` is an
    /// [`Expr::Infix`].
    LikeEscape {
        /// Tested expression.
        expr: Box<Expr>,
        /// Pattern.
        pattern: Box<Expr>,
        /// Escape character expression.
        escape: Box<Expr>,
        /// Whether NOT was specified.
        negated: bool,
    },
    /// `CASE [operand] WHEN ... THEN ... [ELSE ...] END`
    Case {
        /// Operand of a simple `CASE`.
        operand: Option<Box<Expr>>,
        /// `WHEN` / `THEN` pairs, in order.
        when_clauses: Vec<(Expr, Expr)>,
        /// `ELSE` result.
        else_clause: Option<Box<Expr>>,
    },
    /// `CAST(expr AS type)`
    Cast {
        /// Converted expression.
        expr: Box<Expr>,
        /// Target type.
        data_type: SqlType,
    },
}

impl Expr {
    /// Creates a column reference.
    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Creates a literal expression.
    #[must_use]
    pub fn literal(value: impl Into<Literal>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates a binary expression.
    #[must_use]
    pub fn infix(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a function call.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Function(FunctionCall {
            name: name.into(),
            args,
        })
    }

    /// Returns the literal if this expression is one.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Infix { op, .. } => op.precedence(),
            Self::Unary { op, .. } => op.precedence(),
            Self::Between { .. } | Self::LikeEscape { .. } => EQUALITY_PRECEDENCE,
            Self::Collate { .. } => COLLATE_PRECEDENCE,
            Self::Literal(Literal::Integer(i)) if *i < 0 => UNARY_PRECEDENCE,
            Self::Literal(Literal::Float(x)) if x.is_sign_negative() => UNARY_PRECEDENCE,
            Self::Literal(_)
            | Self::Identifier(_)
            | Self::List(_)
            | Self::Function(_)
            | Self::Case { .. }
            | Self::Cast { .. } => PRIMARY_PRECEDENCE,
        }
    }

    /// Returns true if the rendering of this expression starts with `-`.
    fn starts_with_minus(&self) -> bool {
        match self {
            Self::Unary {
                op: UnaryOp::Neg, ..
            } => true,
            Self::Literal(Literal::Integer(i)) => *i < 0,
            Self::Literal(Literal::Float(x)) => x.is_sign_negative(),
            _ => false,
        }
    }
}

/// Writes `expr`, parenthesized when its precedence is below `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if expr.precedence() < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit) => write!(f, "{lit}"),
            Self::Identifier(name) => f.write_str(&quote_identifier(name)),
            Self::Infix { op, left, right } => {
                let level = op.precedence();
                // Left-associative: an equal-precedence right operand needs parentheses.
                write_operand(f, left, level)?;
                write!(f, " {} ", op.as_str())?;
                write_operand(f, right, level + 1)
            }
            Self::Unary { op, operand } => match op {
                UnaryOp::Not => {
                    f.write_str("NOT ")?;
                    write_operand(f, operand, NOT_PRECEDENCE)
                }
                // Keeps `-` apart from a numeric literal so it is not folded into it.
                UnaryOp::Neg
                    if operand.starts_with_minus()
                        || matches!(
                            **operand,
                            Expr::Literal(Literal::Integer(_) | Literal::Float(_))
                        ) =>
                {
                    write!(f, "-({operand})")
                }
                _ => {
                    f.write_str(op.as_str())?;
                    write_operand(f, operand, UNARY_PRECEDENCE)
                }
            },
            Self::List(items) => {
                f.write_str("(")?;
                write_list(f, items)?;
                f.write_str(")")
            }
            Self::Function(call) => {
                write!(f, "{}(", call.name)?;
                write_list(f, &call.args)?;
                f.write_str(")")
            }
            Self::Between {
                expr,
                low,
                high,
                negated,
            } => {
                write_operand(f, expr, EQUALITY_PRECEDENCE)?;
                f.write_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " })?;
                write_operand(f, low, EQUALITY_PRECEDENCE + 1)?;
                f.write_str(" AND ")?;
                write_operand(f, high, EQUALITY_PRECEDENCE + 1)
            }
            Self::Collate { expr, collation } => {
                write_operand(f, expr, COLLATE_PRECEDENCE)?;
                write!(f, " COLLATE {}", quote_identifier(collation))
            }
            Self::LikeEscape {
                expr,
                pattern,
                escape,
                negated,
            } => {
                write_operand(f, expr, EQUALITY_PRECEDENCE)?;
                f.write_str(if *negated { " NOT LIKE " } else { " LIKE " })?;
                write_operand(f, pattern, EQUALITY_PRECEDENCE + 1)?;
                f.write_str(" ESCAPE ")?;
                write_operand(f, escape, EQUALITY_PRECEDENCE + 1)
            }
            Self::Case {
                operand,
                when_clauses,
                else_clause,
            } => {
                f.write_str("CASE")?;
                if let Some(operand) = operand {
                    write!(f, " {operand}")?;
                }
                for (when, then) in when_clauses {
                    write!(f, " WHEN {when} THEN {then}")?;
                }
                if let Some(otherwise) = else_clause {
                    write!(f, " ELSE {otherwise}")?;
                }
                f.write_str(" END")
            }
            Self::Cast { expr, data_type } => write!(f, "CAST({expr} AS {data_type})"),
        }
    }
}
