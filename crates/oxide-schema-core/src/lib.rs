//! # oxide-schema-core
//!
//! Declarative schemas for SQLite, and the differ that plans migrations between them.
//!
//! This crate provides:
//! - A schema model (`Column`, `Table`, `AutoTable`, `Schema`) with structural equality
//! - A hand-written parser for the `CREATE TABLE` dialect stored in `sqlite_master`
//! - A differ producing an ordered list of `MigrateOperation`s, with positional rename
//!   detection
//!
//! Applying a diff to a live database lives in `oxide-schema-sqlite`.
//!
//! ## Diffing
//!
//! ```rust
//! use oxide_schema_core::{MigrateOperation, Schema, diff_schemas};
//!
//! let live = Schema::from_sql("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)").unwrap();
//! let declared =
//!     Schema::from_sql("CREATE TABLE people (id INTEGER PRIMARY KEY, legal_name TEXT)").unwrap();
//!
//! let diff = diff_schemas(&live, &declared, true);
//! assert_eq!(
//!     diff,
//!     vec![MigrateOperation::rename_column("people", "name", "legal_name")]
//! );
//! assert_eq!(diff.summary(), "Would have performed 1 operation(s) on 1 table(s).");
//! ```

pub mod ast;
pub mod lexer;
pub mod migrations;
pub mod parser;
pub mod schema;

pub use ast::{Constraint, Expr, ForeignKey, ForeignKeyAction, Literal, quote_identifier};
pub use migrations::{
    Diff, MigrateOperation, diff_schemas, diff_table_against, diff_tables, rename_column,
};
pub use parser::{ParseError, parse_column, parse_create_table, parse_expression, parse_script};
pub use schema::{AutoTable, Column, Schema, SchemaError, SqlType, Table};
