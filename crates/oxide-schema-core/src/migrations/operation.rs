//! Migration operations and diffs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::quote_identifier;
use crate::schema::{Column, Table};

/// A single schema change.
///
/// Operations are plain values produced fresh by each diff. The applier interprets them; they
/// carry no SQL of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MigrateOperation {
    /// Create a new table.
    CreateTable {
        /// Table name.
        name: String,
        /// Column definitions, in order.
        columns: Vec<Column>,
        /// Raw table-level constraints.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        table_constraints: Vec<String>,
        /// Whether the table is `WITHOUT ROWID`.
        #[serde(default)]
        without_rowid: bool,
        /// Whether the table is `STRICT`.
        #[serde(default)]
        strict: bool,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        name: String,
    },

    /// Rename a table.
    RenameTable {
        /// Old table name.
        old_name: String,
        /// New table name.
        new_name: String,
    },

    /// Add a column to the end of a table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column definition.
        column: Column,
    },

    /// Drop a column from a table.
    DropColumn {
        /// Table name.
        table: String,
        /// Column name.
        column_name: String,
    },

    /// Replace a column's definition, keeping its name and position.
    AlterColumn {
        /// Table name.
        table: String,
        /// Column name.
        column_name: String,
        /// The new definition. Its name must equal `column_name`.
        definition: Column,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Old column name.
        old_name: String,
        /// New column name.
        new_name: String,
    },

    /// Put a table's columns in a new order.
    ReorderColumns {
        /// Table name.
        table: String,
        /// Every column name of the table, in the new order.
        new_order: Vec<String>,
    },
}

impl MigrateOperation {
    /// Creates a `CreateTable` operation reproducing `table`.
    #[must_use]
    pub fn create_table(table: &Table) -> Self {
        Self::CreateTable {
            name: table.name.clone(),
            columns: table.columns().to_vec(),
            table_constraints: table.table_constraints.clone(),
            without_rowid: table.without_rowid,
            strict: table.strict,
        }
    }

    /// Creates a `DropTable` operation.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable { name: name.into() }
    }

    /// Creates a `RenameTable` operation.
    #[must_use]
    pub fn rename_table(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::RenameTable {
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: Column) -> Self {
        Self::AddColumn {
            table: table.into(),
            column,
        }
    }

    /// Creates a `DropColumn` operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self::DropColumn {
            table: table.into(),
            column_name: column_name.into(),
        }
    }

    /// Creates an `AlterColumn` operation named after `definition`.
    #[must_use]
    pub fn alter_column(table: impl Into<String>, definition: Column) -> Self {
        Self::AlterColumn {
            table: table.into(),
            column_name: definition.name.clone(),
            definition,
        }
    }

    /// Creates a `RenameColumn` operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    /// Creates a `ReorderColumns` operation.
    #[must_use]
    pub fn reorder_columns<I, S>(table: impl Into<String>, new_order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ReorderColumns {
            table: table.into(),
            new_order: new_order.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the table this operation touches. For a rename, that is the old name.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { name, .. } | Self::DropTable { name } => name,
            Self::RenameTable { old_name, .. } => old_name,
            Self::AddColumn { table, .. }
            | Self::DropColumn { table, .. }
            | Self::AlterColumn { table, .. }
            | Self::RenameColumn { table, .. }
            | Self::ReorderColumns { table, .. } => table,
        }
    }

    /// Returns true if the applier carries this operation out by rebuilding the table.
    #[must_use]
    pub const fn needs_rebuild(&self) -> bool {
        matches!(
            self,
            Self::DropColumn { .. }
                | Self::AlterColumn { .. }
                | Self::RenameColumn { .. }
                | Self::ReorderColumns { .. }
        )
    }
}

impl fmt::Display for MigrateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable { name, .. } => write!(f, "Create table {name}"),
            Self::DropTable { name } => write!(f, "Drop table {name}"),
            Self::RenameTable { old_name, new_name } => {
                write!(f, "Rename table {old_name} => {new_name}")
            }
            Self::AddColumn { column, .. } => write!(f, "Add column: {column}"),
            Self::DropColumn { column_name, .. } => write!(f, "Drop column {column_name}"),
            Self::AlterColumn {
                column_name,
                definition,
                ..
            } => write!(
                f,
                "Alter column: {} {}",
                quote_identifier(column_name),
                definition.definition()
            ),
            Self::RenameColumn {
                old_name, new_name, ..
            } => write!(f, "Rename column: {old_name} => {new_name}"),
            Self::ReorderColumns { new_order, .. } => {
                write!(f, "Reorder columns: {}", new_order.join(", "))
            }
        }
    }
}

/// An ordered list of migration operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diff(Vec<MigrateOperation>);

impl Diff {
    /// Creates an empty diff.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an operation.
    pub fn push(&mut self, operation: MigrateOperation) {
        self.0.push(operation);
    }

    /// Returns the operations in order.
    #[must_use]
    pub fn operations(&self) -> &[MigrateOperation] {
        &self.0
    }

    /// Returns an iterator over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, MigrateOperation> {
        self.0.iter()
    }

    /// Returns the number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the distinct tables touched, in first-seen order.
    #[must_use]
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = Vec::new();
        for operation in &self.0 {
            let table = operation.table();
            if !tables.contains(&table) {
                tables.push(table);
            }
        }
        tables
    }

    /// Returns a one-line summary such as `Would have performed 3 operation(s) on 2 table(s).`
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Would have performed {} operation(s) on {} table(s).",
            self.len(),
            self.tables().len()
        )
    }

    /// Returns the operations touching `table`.
    pub fn for_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a MigrateOperation> {
        self.0.iter().filter(move |op| op.table() == table)
    }

    /// Consumes the diff, returning the operations.
    #[must_use]
    pub fn into_inner(self) -> Vec<MigrateOperation> {
        self.0
    }
}

impl From<Vec<MigrateOperation>> for Diff {
    fn from(operations: Vec<MigrateOperation>) -> Self {
        Self(operations)
    }
}

impl FromIterator<MigrateOperation> for Diff {
    fn from_iter<I: IntoIterator<Item = MigrateOperation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<MigrateOperation> for Diff {
    fn extend<I: IntoIterator<Item = MigrateOperation>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Diff {
    type Item = MigrateOperation;
    type IntoIter = std::vec::IntoIter<MigrateOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diff {
    type Item = &'a MigrateOperation;
    type IntoIter = std::slice::Iter<'a, MigrateOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl PartialEq<Vec<MigrateOperation>> for Diff {
    fn eq(&self, other: &Vec<MigrateOperation>) -> bool {
        &self.0 == other
    }
}
