//! Schema model errors.

use crate::parser::ParseError;

/// Errors raised when a schema description is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// Two tables share a name.
    #[error("duplicate table '{0}'")]
    DuplicateTable(String),

    /// Two columns of one table share a name.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A table name that is not part of the schema.
    #[error("table '{0}' does not exist")]
    UnknownTable(String),

    /// A column name that is not part of the table.
    #[error("column '{column}' does not exist in table '{table}'")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// SQL text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
