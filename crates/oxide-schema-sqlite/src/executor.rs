//! Diff application.
//!
//! [`Database::apply_diff`] runs a whole diff atomically:
//!
//! - `PRAGMA foreign_keys = 0`, outside the transaction since SQLite ignores it inside one
//! - `BEGIN`
//! - each operation in order, refreshing the cached schema after each
//! - `COMMIT`, or `ROLLBACK` on the first failure
//! - `PRAGMA foreign_keys = 1`, whatever happened
//!
//! Rebuilds run their own `PRAGMA foreign_key_check`, so a diff never commits rows whose
//! foreign keys dangle.

use oxide_schema_core::ast::always_quote;
use oxide_schema_core::{Diff, MigrateOperation, Table};
use tracing::{info, warn};

use crate::database::Database;
use crate::error::{MigrateError, Result};
use crate::rebuild::RebuildPlan;

impl Database {
    /// Applies every operation of `diff` in one transaction.
    ///
    /// On error the transaction is rolled back, so the database and the cached schema are
    /// exactly as before the call. Foreign-key enforcement is switched back on in every case.
    ///
    /// # Errors
    ///
    /// - [`MigrateError::ApiMisuse`] if a transaction is already open, or an operation is
    ///   malformed
    /// - [`MigrateError::TableDoesNotExist`] and [`MigrateError::ColumnDoesNotExist`] if an
    ///   operation names something the live schema lacks
    /// - [`MigrateError::ForeignKeyViolation`] if a rebuild leaves dangling references
    /// - [`MigrateError::Database`] for errors raised by SQLite, including integrity errors
    ///   while copying rows
    pub async fn apply_diff(&mut self, diff: &Diff) -> Result<()> {
        if self.in_transaction() {
            return Err(MigrateError::misuse(
                "cannot apply a diff while a transaction is open",
            ));
        }
        if diff.is_empty() {
            return Ok(());
        }

        info!(
            operations = diff.len(),
            tables = diff.tables().len(),
            "Applying diff"
        );

        self.set_foreign_keys(false).await?;
        let result = self.apply_in_transaction(diff).await;
        let restored = self.set_foreign_keys(true).await;

        match (result, restored) {
            (Ok(()), restored) => {
                restored?;
                info!(operations = diff.len(), "Diff applied");
                Ok(())
            }
            (Err(err), restored) => {
                if let Err(restore_err) = restored {
                    warn!(error = %restore_err, "Failed to re-enable foreign keys");
                }
                Err(err)
            }
        }
    }

    async fn apply_in_transaction(&mut self, diff: &Diff) -> Result<()> {
        self.begin().await?;

        let mut outcome = Ok(());
        for operation in diff {
            if let Err(err) = self.apply_operation(operation).await {
                warn!(operation = %operation, error = %err, "Operation failed, rolling back");
                outcome = Err(err);
                break;
            }
        }
        if outcome.is_ok() {
            outcome = self.commit().await;
        }

        if outcome.is_err() && self.in_transaction() {
            if let Err(rollback_err) = self.rollback().await {
                warn!(error = %rollback_err, "Rollback failed");
                if let Err(refresh_err) = self.refresh_schema().await {
                    warn!(error = %refresh_err, "Failed to re-read schema");
                }
            }
        }
        outcome
    }

    async fn apply_operation(&mut self, operation: &MigrateOperation) -> Result<()> {
        info!(table = %operation.table(), operation = %operation, "Applying operation");

        match operation {
            MigrateOperation::CreateTable {
                name,
                columns,
                table_constraints,
                without_rowid,
                strict,
            } => {
                if columns.is_empty() {
                    return Err(MigrateError::misuse(format!(
                        "table '{name}' needs at least one column"
                    )));
                }
                let mut table = Table::new(name.as_str(), columns.clone())?;
                table.table_constraints.clone_from(table_constraints);
                table.without_rowid = *without_rowid;
                table.strict = *strict;
                self.execute(&table.create_sql()).await?;
            }
            MigrateOperation::DropTable { name } => {
                self.require_table(name)?;
                self.execute(&format!("DROP TABLE {}", always_quote(name)))
                    .await?;
            }
            MigrateOperation::RenameTable { old_name, new_name } => {
                self.require_table(old_name)?;
                self.execute(&format!(
                    "ALTER TABLE {} RENAME TO {}",
                    always_quote(old_name),
                    always_quote(new_name)
                ))
                .await?;
            }
            MigrateOperation::AddColumn { table, column } => {
                self.require_table(table)?;
                self.execute(&format!(
                    "ALTER TABLE {} ADD COLUMN {column}",
                    always_quote(table)
                ))
                .await?;
            }
            MigrateOperation::DropColumn { table, column_name } => {
                let plan = RebuildPlan::drop_column(self.require_table(table)?, column_name)?;
                plan.execute(self.connection()).await?;
            }
            MigrateOperation::AlterColumn {
                table,
                column_name,
                definition,
            } => {
                if definition.name != *column_name {
                    return Err(MigrateError::misuse(format!(
                        "cannot alter column '{column_name}' into a column named '{}'",
                        definition.name
                    )));
                }
                let plan = RebuildPlan::alter_column(self.require_table(table)?, definition)?;
                plan.execute(self.connection()).await?;
            }
            MigrateOperation::RenameColumn {
                table,
                old_name,
                new_name,
            } => {
                let plan =
                    RebuildPlan::rename_column(self.require_table(table)?, old_name, new_name)?;
                plan.execute(self.connection()).await?;
            }
            MigrateOperation::ReorderColumns { table, new_order } => {
                let plan = RebuildPlan::reorder_columns(self.require_table(table)?, new_order)?;
                plan.execute(self.connection()).await?;
            }
        }

        self.refresh_schema().await?;
        Ok(())
    }
}
