//! Error types for the migration applier.

use std::fmt;

use oxide_schema_core::{ParseError, SchemaError};

/// One row reported by `PRAGMA foreign_key_check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyViolation {
    /// Table holding the offending row.
    pub table: String,
    /// Rowid of the offending row, `None` for `WITHOUT ROWID` tables.
    pub rowid: Option<i64>,
    /// Table the foreign key refers to.
    pub parent: String,
    /// Index of the failing foreign key in the child table's key list.
    pub fkid: i64,
}

impl fmt::Display for ForeignKeyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rowid {
            Some(rowid) => write!(
                f,
                "{} row {rowid} references missing row in {} (key {})",
                self.table, self.parent, self.fkid
            ),
            None => write!(
                f,
                "{} references missing row in {} (key {})",
                self.table, self.parent, self.fkid
            ),
        }
    }
}

/// Errors that can occur while inspecting or migrating a database.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// An operation names a column the table does not have.
    #[error("Column '{column}' does not exist in table '{table}'")]
    ColumnDoesNotExist {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// An operation names a table the database does not have.
    #[error("Table '{0}' does not exist")]
    TableDoesNotExist(String),

    /// The API was called in a way it does not support.
    #[error("API misuse: {0}")]
    ApiMisuse(String),

    /// A table rebuild left rows whose foreign keys point nowhere.
    #[error("Foreign key check failed:\n{}", .0.iter().map(|v| format!("  - {v}")).collect::<Vec<_>>().join("\n"))]
    ForeignKeyViolation(Vec<ForeignKeyViolation>),

    /// A table's stored SQL could not be parsed.
    #[error("Failed to parse table '{table}': {source}")]
    Parse {
        /// Table name.
        table: String,
        /// The parse failure.
        #[source]
        source: ParseError,
    },

    /// Invalid schema description.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Database error, including integrity errors raised while copying rows.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading schema files, writing backups).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Creates an `ApiMisuse` error.
    #[must_use]
    pub fn misuse(message: impl Into<String>) -> Self {
        Self::ApiMisuse(message.into())
    }
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let err = MigrateError::ForeignKeyViolation(vec![ForeignKeyViolation {
            table: "pets".to_string(),
            rowid: Some(3),
            parent: "people".to_string(),
            fkid: 0,
        }]);
        assert_eq!(
            err.to_string(),
            "Foreign key check failed:\n  - pets row 3 references missing row in people (key 0)"
        );
    }

    #[test]
    fn test_column_error_display() {
        let err = MigrateError::ColumnDoesNotExist {
            table: "people".to_string(),
            column: "age".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'age' does not exist in table 'people'");
    }
}
