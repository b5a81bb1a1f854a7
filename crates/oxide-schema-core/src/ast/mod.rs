//! Abstract syntax tree for column definitions.

mod constraint;
mod expression;

pub use constraint::{Constraint, ForeignKey, ForeignKeyAction, SortOrder};
pub use expression::{BinaryOp, Expr, FunctionCall, Literal, UnaryOp};

use crate::lexer::is_reserved_word;

/// Returns `name` ready to embed in SQL, double-quoted only when SQLite requires it.
///
/// Plain words that are not reserved keywords are returned unchanged, so `end` stays `end`
/// while `order` becomes `"order"`.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain && !is_reserved_word(name) {
        name.to_string()
    } else {
        always_quote(name)
    }
}

/// Returns `name` wrapped in double quotes, with embedded quotes doubled.
#[must_use]
pub fn always_quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
