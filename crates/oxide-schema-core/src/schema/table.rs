//! Table descriptors.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::factory::{integer, primary_key, timestamp};
use super::{Column, SchemaError};
use crate::ast::always_quote;

/// Names of the audit columns appended by [`AutoTable`].
pub const AUTO_TIMESTAMP_COLUMNS: [&str; 2] = ["created_at", "last_updated_at"];

/// A table: a name and its columns in physical order.
///
/// Column names are unique; [`Table::new`] refuses duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    columns: Vec<Column>,
    /// Raw text of table-level constraints such as `UNIQUE(a, b)`.
    ///
    /// These are carried through rebuilds verbatim and never diffed.
    #[serde(default)]
    pub table_constraints: Vec<String>,
    /// `WITHOUT ROWID` option.
    #[serde(default)]
    pub without_rowid: bool,
    /// `STRICT` option.
    #[serde(default)]
    pub strict: bool,
}

impl Table {
    /// Creates a table, checking that column names are unique.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if two columns share a name.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, SchemaError> {
        let name = name.into();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self {
            name,
            columns,
            table_constraints: Vec::new(),
            without_rowid: false,
            strict: false,
        })
    }

    /// Appends a raw table-level constraint.
    #[must_use]
    pub fn with_table_constraint(mut self, sql: impl Into<String>) -> Self {
        self.table_constraints.push(sql.into());
        self
    }

    /// Returns the columns in physical order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column names in physical order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the position of the named column.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns true if the table has a column with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Looks up a column by name, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownColumn`] if there is no such column.
    pub fn require_column(&self, name: &str) -> Result<&Column, SchemaError> {
        self.column(name).ok_or_else(|| SchemaError::UnknownColumn {
            table: self.name.clone(),
            column: name.to_string(),
        })
    }

    /// Returns a copy of this table with a different name and column list.
    ///
    /// Table-level constraints and options are kept.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if two columns share a name.
    pub fn with_columns(
        &self,
        name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<Self, SchemaError> {
        let mut table = Self::new(name, columns)?;
        table.table_constraints.clone_from(&self.table_constraints);
        table.without_rowid = self.without_rowid;
        table.strict = self.strict;
        Ok(table)
    }

    /// Renders the `CREATE TABLE` statement for this table.
    #[must_use]
    pub fn create_sql(&self) -> String {
        let mut lines: Vec<String> = self.columns.iter().map(ToString::to_string).collect();
        lines.extend(self.table_constraints.iter().cloned());

        let mut options = Vec::new();
        if self.without_rowid {
            options.push("WITHOUT ROWID");
        }
        if self.strict {
            options.push("STRICT");
        }
        let suffix = if options.is_empty() {
            String::new()
        } else {
            format!(" {}", options.join(", "))
        };

        format!(
            "CREATE TABLE {}(\n  {}\n){suffix}",
            always_quote(&self.name),
            lines.join(",\n  ")
        )
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.create_sql())
    }
}

/// Constructors for tables with an `id` primary key and audit timestamps.
///
/// The resulting table is `id`, then the caller's columns, then `created_at` and
/// `last_updated_at`.
#[derive(Debug, Clone, Copy)]
pub struct AutoTable;

impl AutoTable {
    /// Builds an auto table whose audit columns are required `TIMESTAMP`s.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if a caller column clashes with an
    /// injected one.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Table, SchemaError> {
        Self::build(name, columns, false)
    }

    /// Builds an auto table whose audit columns are required `INTEGER` epoch seconds.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateColumn`] if a caller column clashes with an
    /// injected one.
    pub fn with_epoch_timestamps(
        name: impl Into<String>,
        columns: Vec<Column>,
    ) -> Result<Table, SchemaError> {
        Self::build(name, columns, true)
    }

    fn build(
        name: impl Into<String>,
        columns: Vec<Column>,
        epoch: bool,
    ) -> Result<Table, SchemaError> {
        let mut all = Vec::with_capacity(columns.len() + 3);
        all.push(primary_key("id").build());
        all.extend(columns);
        for audit in AUTO_TIMESTAMP_COLUMNS {
            let column = if epoch {
                integer(audit).required().build()
            } else {
                timestamp(audit).required().build()
            };
            all.push(column);
        }
        Table::new(name, all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SqlType, date, text};

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let err = Table::new("t", vec![text("a").build(), text("a").build()]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                table: "t".to_string(),
                column: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_lookup() {
        let table = Table::new("t", vec![text("a").build(), date("b").build()]).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.position("b"), Some(1));
        assert!(table.contains("a"));
        assert!(table.column("c").is_none());
        assert!(table.require_column("c").is_err());
    }

    #[test]
    fn test_auto_table_layout() {
        let table = AutoTable::new("events", vec![date("start").build()]).unwrap();
        assert_eq!(
            table.column_names(),
            vec!["id", "start", "created_at", "last_updated_at"]
        );
        assert!(table.columns()[0].is_primary_key());
        assert_eq!(
            table.column("created_at").map(|c| c.sql_type.clone()),
            Some(SqlType::Timestamp)
        );
    }

    #[test]
    fn test_auto_table_epoch_timestamps() {
        let table = AutoTable::with_epoch_timestamps("events", vec![]).unwrap();
        assert_eq!(
            table.column("last_updated_at").map(ToString::to_string),
            Some("last_updated_at INTEGER NOT NULL".to_string())
        );
    }

    #[test]
    fn test_auto_table_rejects_clashing_id() {
        assert!(AutoTable::new("t", vec![text("id").build()]).is_err());
    }

    #[test]
    fn test_create_sql() {
        let table = Table::new("people", vec![text("name").required().build()])
            .unwrap()
            .with_table_constraint("UNIQUE(name)");
        assert_eq!(
            table.create_sql(),
            "CREATE TABLE \"people\"(\n  name TEXT NOT NULL CHECK(name != ''),\n  UNIQUE(name)\n)"
        );
    }
}
