//! Migration applier for SQLite.
//!
//! `oxide-schema-sqlite` connects to a live database, reads its schema back from
//! `sqlite_master`, and applies diffs computed by `oxide-schema-core`:
//!
//! - **Database** - Connection, schema cache, transactions and single-operation helpers
//! - **Executor** - Atomic application of a whole diff
//! - **Rebuild** - The create/copy/drop/rename/check procedure for changes SQLite cannot
//!   make with `ALTER TABLE`
//! - **Options** - Connection configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use oxide_schema_core::schema::{integer, text};
//! use oxide_schema_core::{AutoTable, Schema};
//! use oxide_schema_sqlite::Database;
//!
//! # async fn run() -> oxide_schema_sqlite::Result<()> {
//! let declared = Schema::new(vec![AutoTable::new(
//!     "people",
//!     vec![text("name").required().into(), integer("age").into()],
//! )?])?;
//!
//! let mut db = Database::open("app.db").await?;
//! let diff = db.diff(&declared, true);
//! for operation in &diff {
//!     println!("{operation}");
//! }
//! db.apply_diff(&diff).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show what would change
//! oxide-schema --database app.db diff schema.sql
//!
//! # Apply it, keeping a backup of the database file
//! oxide-schema --database app.db migrate schema.sql --write
//! ```

pub mod backup;
pub mod database;
pub mod error;
mod executor;
pub mod options;
pub mod rebuild;

pub use database::Database;
pub use error::{ForeignKeyViolation, MigrateError, Result};
pub use options::DatabaseOptions;
pub use rebuild::{RebuildPlan, TEMP_TABLE_PREFIX};
