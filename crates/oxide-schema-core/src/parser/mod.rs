//! DDL parser.
//!
//! Reads the `CREATE TABLE` dialect SQLite stores in `sqlite_master`, plus the standalone
//! column definitions and expressions used when declaring schemas by hand.

mod error;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;

use crate::ast::Expr;
use crate::schema::{Column, Table};

/// Parses a single `CREATE TABLE` statement.
///
/// # Errors
///
/// Returns a `ParseError` if the statement is malformed or uses unsupported syntax.
pub fn parse_create_table(sql: &str) -> Result<Table, ParseError> {
    let mut parser = Parser::new(sql);
    let table = parser.parse_create_table()?;
    parser.expect_end()?;
    Ok(table)
}

/// Parses a column definition such as `email TEXT NOT NULL UNIQUE`.
///
/// # Errors
///
/// Returns a `ParseError` if the definition is malformed.
pub fn parse_column(sql: &str) -> Result<Column, ParseError> {
    let mut parser = Parser::new(sql);
    let column = parser.parse_column_def()?;
    parser.expect_end()?;
    Ok(column)
}

/// Parses a standalone SQL expression.
///
/// # Errors
///
/// Returns a `ParseError` if the expression is malformed.
pub fn parse_expression(sql: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(sql);
    let expr = parser.parse_expression(0)?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parses a script of `CREATE TABLE` statements separated by semicolons.
///
/// # Errors
///
/// Returns a `ParseError` on the first malformed statement.
pub fn parse_script(sql: &str) -> Result<Vec<Table>, ParseError> {
    Parser::new(sql).parse_script()
}
