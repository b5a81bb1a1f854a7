//! Migration planning: operations, the schema differ and the column renamer.

mod diff;
mod operation;
mod rename;

pub use diff::{diff_schemas, diff_table_against, diff_tables};
pub use operation::{Diff, MigrateOperation};
pub use rename::rename_column;
