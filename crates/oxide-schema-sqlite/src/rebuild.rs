//! Table rebuilds.
//!
//! SQLite cannot drop, alter, rename or reorder columns in place in the general case, so these
//! operations recreate the table:
//!
//! 1. `CREATE TABLE` the new definition under a temporary name
//! 2. `INSERT INTO` the temporary table, selecting from the original
//! 3. `DROP TABLE` the original
//! 4. `ALTER TABLE ... RENAME TO` the original name
//! 5. `PRAGMA foreign_key_check`, failing on any violation
//!
//! Foreign-key enforcement must be off and a transaction open while this runs. The temporary
//! name is fixed, so two rebuilds of the same table must never run concurrently.

use oxide_schema_core::ast::always_quote;
use oxide_schema_core::{Column, Table, rename_column};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{ForeignKeyViolation, MigrateError, Result};

/// Prefix of the temporary table used while rebuilding.
pub const TEMP_TABLE_PREFIX: &str = "oxide_tmp_";

/// Returns the temporary name used while rebuilding `table`.
#[must_use]
pub fn temp_table_name(table: &str) -> String {
    format!("{TEMP_TABLE_PREFIX}{table}")
}

/// The new shape of a table and how its rows are carried over.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildPlan {
    /// The table as it must look afterwards, under its original name.
    pub table: Table,
    /// `(new column, old column)` pairs copied by the data step, in new column order.
    pub copy: Vec<(String, String)>,
}

impl RebuildPlan {
    /// Builds a plan from the new column list and, per new column, the old column feeding it.
    fn new(old: &Table, columns: Vec<Column>, sources: Vec<String>) -> Result<Self> {
        let copy = columns
            .iter()
            .zip(sources)
            // Generated columns are computed, never inserted.
            .filter(|(column, _)| !column.is_generated())
            .map(|(column, source)| (column.name.clone(), source))
            .collect();
        let table = old.with_columns(&old.name, columns)?;
        Ok(Self { table, copy })
    }

    /// Plans removing `column` from `old`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no such column.
    pub fn drop_column(old: &Table, column: &str) -> Result<Self> {
        require_column(old, column)?;
        let columns: Vec<Column> = old
            .columns()
            .iter()
            .filter(|c| c.name != column)
            .cloned()
            .collect();
        let sources = columns.iter().map(|c| c.name.clone()).collect();
        Self::new(old, columns, sources)
    }

    /// Plans replacing the definition of the column named like `definition`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no such column.
    pub fn alter_column(old: &Table, definition: &Column) -> Result<Self> {
        require_column(old, &definition.name)?;
        let columns: Vec<Column> = old
            .columns()
            .iter()
            .map(|c| {
                if c.name == definition.name {
                    definition.clone()
                } else {
                    c.clone()
                }
            })
            .collect();
        let sources = old.columns().iter().map(|c| c.name.clone()).collect();
        Self::new(old, columns, sources)
    }

    /// Plans renaming column `from` to `to`, including references in its own constraints.
    ///
    /// Table-level constraints are copied verbatim and are not rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no column `from`, and a
    /// schema error if `to` is already taken.
    pub fn rename_column(old: &Table, from: &str, to: &str) -> Result<Self> {
        require_column(old, from)?;
        let columns: Vec<Column> = old
            .columns()
            .iter()
            .map(|c| {
                if c.name == from {
                    rename_column(c, from, to)
                } else {
                    c.clone()
                }
            })
            .collect();
        let sources = old.columns().iter().map(|c| c.name.clone()).collect();
        Self::new(old, columns, sources)
    }

    /// Plans putting the columns of `old` in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] unless `order` names every column exactly once.
    pub fn reorder_columns(old: &Table, order: &[String]) -> Result<Self> {
        let mut wanted: Vec<&str> = order.iter().map(String::as_str).collect();
        let mut current = old.column_names();
        wanted.sort_unstable();
        current.sort_unstable();
        if wanted != current {
            return Err(MigrateError::misuse(format!(
                "new column order for table '{}' must name each of its columns exactly once",
                old.name
            )));
        }

        let columns: Vec<Column> = order
            .iter()
            .filter_map(|name| old.column(name).cloned())
            .collect();
        Self::new(old, columns, order.to_vec())
    }

    /// Returns the statements for steps one to four.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        let original = always_quote(&self.table.name);
        let temp_name = temp_table_name(&self.table.name);
        let temp = always_quote(&temp_name);

        let mut create = self.table.clone();
        create.name = temp_name;

        let targets: Vec<String> = self.copy.iter().map(|(to, _)| always_quote(to)).collect();
        let sources: Vec<String> = self
            .copy
            .iter()
            .map(|(_, from)| always_quote(from))
            .collect();

        vec![
            create.create_sql(),
            format!(
                "INSERT INTO {temp} ({}) SELECT {} FROM {original}",
                targets.join(", "),
                sources.join(", ")
            ),
            format!("DROP TABLE {original}"),
            format!("ALTER TABLE {temp} RENAME TO {original}"),
        ]
    }

    /// Runs the rebuild, including the foreign-key check.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if a statement fails, for example when copied rows violate
    /// a new `NOT NULL` or `CHECK` constraint, and [`MigrateError::ForeignKeyViolation`] if
    /// the check reports rows.
    pub async fn execute(&self, conn: &mut SqliteConnection) -> Result<()> {
        for sql in self.statements() {
            debug!(sql = %sql, "Executing SQL");
            sqlx::query(&sql).execute(&mut *conn).await?;
        }

        let violations = foreign_key_check(conn).await?;
        if violations.is_empty() {
            Ok(())
        } else {
            Err(MigrateError::ForeignKeyViolation(violations))
        }
    }
}

fn require_column(table: &Table, column: &str) -> Result<()> {
    if table.contains(column) {
        Ok(())
    } else {
        Err(MigrateError::ColumnDoesNotExist {
            table: table.name.clone(),
            column: column.to_string(),
        })
    }
}

/// Runs `PRAGMA foreign_key_check` over the whole database.
///
/// # Errors
///
/// Returns the engine's error if the pragma fails.
pub async fn foreign_key_check(conn: &mut SqliteConnection) -> Result<Vec<ForeignKeyViolation>> {
    debug!(sql = "PRAGMA foreign_key_check", "Executing SQL");
    let rows: Vec<(String, Option<i64>, String, i64)> =
        sqlx::query_as("PRAGMA foreign_key_check")
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows
        .into_iter()
        .map(|(table, rowid, parent, fkid)| ForeignKeyViolation {
            table,
            rowid,
            parent,
            fkid,
        })
        .collect())
}
