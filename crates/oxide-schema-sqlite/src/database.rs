//! Live database handle.
//!
//! A [`Database`] owns one SQLite connection and a cached copy of the schema read from
//! `sqlite_master`. The cache is refreshed after every operation, and after a rollback.

use oxide_schema_core::lexer::{Lexer, TokenKind};
use oxide_schema_core::{
    Column, Diff, MigrateOperation, Schema, Table, diff_schemas, diff_table_against,
    parse_create_table,
};
use sqlx::{Connection, SqliteConnection};
use tracing::{debug, info};

use crate::error::{MigrateError, Result};
use crate::options::DatabaseOptions;

/// Query listing the user tables and their stored SQL.
pub const LIST_TABLES_SQL: &str =
    "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'";

/// Statements that open or close a transaction behind the handle's back.
const TRANSACTION_CONTROL: [&str; 6] =
    ["BEGIN", "COMMIT", "END", "ROLLBACK", "SAVEPOINT", "RELEASE"];

/// Returns the leading keyword of the first statement in `sql` that controls a transaction.
fn transaction_control(sql: &str) -> Option<&'static str> {
    let mut lexer = Lexer::new(sql);
    let mut at_start = true;
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::Eof => return None,
            TokenKind::Semicolon => at_start = true,
            _ if at_start => {
                at_start = false;
                let word = token.span.slice(sql);
                if let Some(keyword) = TRANSACTION_CONTROL
                    .into_iter()
                    .find(|keyword| keyword.eq_ignore_ascii_case(word))
                {
                    return Some(keyword);
                }
            }
            _ => {}
        }
    }
}

/// A connection to a SQLite database, with its introspected schema.
pub struct Database {
    conn: SqliteConnection,
    options: DatabaseOptions,
    schema: Schema,
    in_transaction: bool,
}

impl Database {
    /// Opens a connection and reads the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a stored table definition cannot
    /// be parsed.
    pub async fn connect(options: DatabaseOptions) -> Result<Self> {
        let conn = SqliteConnection::connect_with(&options.connect_options()?).await?;
        let mut db = Self {
            conn,
            options,
            schema: Schema::default(),
            in_transaction: false,
        };
        db.refresh_schema().await?;
        info!(
            database = %db.options.path(),
            tables = db.schema.len(),
            "Opened database"
        );
        Ok(db)
    }

    /// Opens the database at `path` with default options.
    ///
    /// # Errors
    ///
    /// See [`Database::connect`].
    pub async fn open(path: impl Into<String>) -> Result<Self> {
        Self::connect(DatabaseOptions::new(path)).await
    }

    /// Opens a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// See [`Database::connect`].
    pub async fn in_memory() -> Result<Self> {
        Self::connect(DatabaseOptions::in_memory()).await
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if the connection does not close cleanly.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }

    /// Returns the options the database was opened with.
    #[must_use]
    pub const fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Returns the cached live schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the underlying connection, for running queries of your own.
    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    /// Re-reads the schema from `sqlite_master`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::Parse`] if a stored table definition cannot be parsed.
    pub async fn refresh_schema(&mut self) -> Result<&Schema> {
        let rows: Vec<(String, Option<String>)> = sqlx::query_as(LIST_TABLES_SQL)
            .fetch_all(&mut self.conn)
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for (name, sql) in rows {
            let Some(sql) = sql else { continue };
            let table = parse_create_table(&sql)
                .map_err(|source| MigrateError::Parse { table: name, source })?;
            tables.push(table);
        }

        self.schema = Schema::new(tables)?;
        debug!(tables = self.schema.len(), "Refreshed schema");
        Ok(&self.schema)
    }

    /// Looks up a live table, failing if it is absent.
    pub(crate) fn require_table(&self, name: &str) -> Result<&Table> {
        self.schema
            .table(name)
            .ok_or_else(|| MigrateError::TableDoesNotExist(name.to_string()))
    }

    /// Runs SQL, returning the number of rows affected.
    ///
    /// Transactions go through [`begin`](Self::begin), [`commit`](Self::commit) and
    /// [`rollback`](Self::rollback) so the handle knows whether one is open.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] if a statement starts with `BEGIN`, `COMMIT`, `END`,
    /// `ROLLBACK`, `SAVEPOINT` or `RELEASE`. Otherwise returns the engine's error.
    pub async fn execute(&mut self, sql: &str) -> Result<u64> {
        if let Some(keyword) = transaction_control(sql) {
            return Err(MigrateError::misuse(format!(
                "{keyword} cannot be run through execute; use begin, commit or rollback"
            )));
        }
        self.run(sql).await
    }

    async fn run(&mut self, sql: &str) -> Result<u64> {
        debug!(sql = %sql, "Executing SQL");
        let result = sqlx::query(sql).execute(&mut self.conn).await?;
        Ok(result.rows_affected())
    }

    // ================================================================
    // Transactions
    // ================================================================

    /// Returns true while an explicit transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    /// Opens a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] if one is already open.
    pub async fn begin(&mut self) -> Result<()> {
        if self.in_transaction {
            return Err(MigrateError::misuse("a transaction is already open"));
        }
        self.run("BEGIN").await?;
        self.in_transaction = true;
        Ok(())
    }

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] if none is open. If the commit itself fails the
    /// transaction stays open.
    pub async fn commit(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(MigrateError::misuse("no transaction to commit"));
        }
        self.run("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    /// Rolls back the open transaction and re-reads the schema.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] if none is open. If the rollback itself fails the
    /// transaction stays open.
    pub async fn rollback(&mut self) -> Result<()> {
        if !self.in_transaction {
            return Err(MigrateError::misuse("no transaction to roll back"));
        }
        self.run("ROLLBACK").await?;
        self.in_transaction = false;
        self.refresh_schema().await?;
        Ok(())
    }

    /// Returns whether `PRAGMA foreign_keys` is on.
    ///
    /// # Errors
    ///
    /// Returns the engine's error.
    pub async fn foreign_keys_enabled(&mut self) -> Result<bool> {
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&mut self.conn)
            .await?;
        Ok(enabled == 1)
    }

    pub(crate) async fn set_foreign_keys(&mut self, enabled: bool) -> Result<()> {
        let sql = if enabled {
            "PRAGMA foreign_keys = 1"
        } else {
            "PRAGMA foreign_keys = 0"
        };
        self.execute(sql).await?;
        Ok(())
    }

    // ================================================================
    // Diffing
    // ================================================================

    /// Returns the operations that bring the live schema in line with `declared`.
    ///
    /// Live tables missing from `declared` are dropped.
    #[must_use]
    pub fn diff(&self, declared: &Schema, detect_renaming: bool) -> Diff {
        diff_schemas(&self.schema, declared, detect_renaming)
    }

    /// Returns the operations that bring one live table in line with `declared`.
    #[must_use]
    pub fn diff_table(&self, declared: &Table, detect_renaming: bool) -> Diff {
        diff_table_against(&self.schema, declared, detect_renaming)
    }

    /// Diffs against `declared` and applies the result. Returns what was applied.
    ///
    /// # Errors
    ///
    /// See [`Database::apply_diff`].
    pub async fn migrate(&mut self, declared: &Schema, detect_renaming: bool) -> Result<Diff> {
        let diff = self.diff(declared, detect_renaming);
        self.apply_diff(&diff).await?;
        Ok(diff)
    }

    /// Like [`Database::migrate`], limited to one table.
    ///
    /// # Errors
    ///
    /// See [`Database::apply_diff`].
    pub async fn migrate_table(&mut self, declared: &Table, detect_renaming: bool) -> Result<Diff> {
        let diff = self.diff_table(declared, detect_renaming);
        self.apply_diff(&diff).await?;
        Ok(diff)
    }

    // ================================================================
    // Single operations
    // ================================================================

    async fn apply_one(&mut self, operation: MigrateOperation) -> Result<()> {
        self.apply_diff(&Diff::from(vec![operation])).await
    }

    /// Creates a table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] if `columns` is empty.
    pub async fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<()> {
        let table = Table::new(name, columns)?;
        self.apply_one(MigrateOperation::create_table(&table)).await
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::TableDoesNotExist`] if there is no such table.
    pub async fn drop_table(&mut self, name: &str) -> Result<()> {
        self.apply_one(MigrateOperation::drop_table(name)).await
    }

    /// Renames a table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::TableDoesNotExist`] if there is no such table.
    pub async fn rename_table(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        self.apply_one(MigrateOperation::rename_table(old_name, new_name))
            .await
    }

    /// Appends a column to a table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::TableDoesNotExist`] if there is no such table, or the engine's
    /// error if SQLite cannot add this kind of column.
    pub async fn add_column(&mut self, table: &str, column: Column) -> Result<()> {
        self.apply_one(MigrateOperation::add_column(table, column))
            .await
    }

    /// Drops a column, rebuilding the table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no such column.
    pub async fn drop_column(&mut self, table: &str, column_name: &str) -> Result<()> {
        self.apply_one(MigrateOperation::drop_column(table, column_name))
            .await
    }

    /// Replaces the definition of the column named like `column`, rebuilding the table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no such column, or the
    /// engine's integrity error if existing rows do not fit the new definition.
    pub async fn alter_column(&mut self, table: &str, column: Column) -> Result<()> {
        self.apply_one(MigrateOperation::alter_column(table, column))
            .await
    }

    /// Renames a column, rebuilding the table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ColumnDoesNotExist`] if there is no column `old_name`.
    pub async fn rename_column(&mut self, table: &str, old_name: &str, new_name: &str) -> Result<()> {
        self.apply_one(MigrateOperation::rename_column(table, old_name, new_name))
            .await
    }

    /// Puts a table's columns in a new order, rebuilding the table.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::ApiMisuse`] unless `new_order` names every column exactly once.
    pub async fn reorder_columns(&mut self, table: &str, new_order: &[&str]) -> Result<()> {
        self.apply_one(MigrateOperation::reorder_columns(
            table,
            new_order.iter().copied(),
        ))
        .await
    }
}
