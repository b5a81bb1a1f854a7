//! Schema model: columns, tables and schemas.
//!
//! The same types describe both the schema declared in code and the schema read back from a
//! live database, so the differ can compare them directly.

mod column;
mod error;
mod factory;
mod table;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use column::{Column, SqlType};
pub use error::SchemaError;
pub use factory::{
    CURRENT_TIMESTAMP_SQL, ColumnBuilder, blob, boolean, current_timestamp, date, decimal,
    foreign_key, integer, primary_key, real, text, time, timestamp,
};
pub use table::{AUTO_TIMESTAMP_COLUMNS, AutoTable, Table};

/// An ordered collection of tables with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    /// Creates a schema, checking that table names are unique.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateTable`] if two tables share a name.
    pub fn new(tables: Vec<Table>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name.as_str()) {
                return Err(SchemaError::DuplicateTable(table.name.clone()));
            }
        }
        Ok(Self { tables })
    }

    /// Parses a script of `CREATE TABLE` statements.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Parse`] on malformed SQL and the usual uniqueness errors.
    pub fn from_sql(sql: &str) -> Result<Self, SchemaError> {
        Self::new(crate::parser::parse_script(sql)?)
    }

    /// Returns the tables in declaration order.
    #[must_use]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Returns the table names in declaration order.
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns true if the schema has a table with this name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Looks up a table by name, failing if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownTable`] if there is no such table.
    pub fn require(&self, name: &str) -> Result<&Table, SchemaError> {
        self.table(name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    /// Returns the number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for table in &self.tables {
            writeln!(f, "{};", table.create_sql())?;
        }
        Ok(())
    }
}
