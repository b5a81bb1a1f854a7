//! Database file backups taken before a migration.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use tracing::info;

use crate::error::Result;

/// Returns the backup location for `database` taken at `at`: `<file>.<YYYYmmdd-HHMMSS>.bak`.
#[must_use]
pub fn backup_path<Tz: TimeZone>(database: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    let mut name = database.as_os_str().to_os_string();
    name.push(format!(".{}.bak", at.format("%Y%m%d-%H%M%S")));
    PathBuf::from(name)
}

/// Copies `database` next to itself under a timestamped name and returns the copy's path.
///
/// # Errors
///
/// Returns [`crate::MigrateError::Io`] if the file cannot be copied.
pub fn backup(database: &Path) -> Result<PathBuf> {
    let target = backup_path(database, &Local::now());
    std::fs::copy(database, &target)?;
    info!(backup = %target.display(), "Backed up database");
    Ok(target)
}
