//! Connection options.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::SqliteConnectOptions;

use crate::error::Result;

/// Location of an in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// How to open a database.
///
/// `path` is either a file path, a `sqlite:` URL or `:memory:`. Foreign-key enforcement is
/// always switched on for the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOptions {
    path: String,
    readonly: bool,
    create_if_missing: bool,
    busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl DatabaseOptions {
    /// Creates options for the database at `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            readonly: false,
            create_if_missing: true,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Creates options for a private in-memory database.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY)
    }

    /// Opens the database read-only.
    #[must_use]
    pub const fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    /// Creates the database file if it does not exist. Ignored when read-only.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Sets how long to wait for a lock held by another connection.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Returns the configured location.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if the database is opened read-only.
    #[must_use]
    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Returns the database file on disk, or `None` for an in-memory database.
    #[must_use]
    pub fn file_path(&self) -> Option<PathBuf> {
        let location = self
            .path
            .strip_prefix("sqlite://")
            .or_else(|| self.path.strip_prefix("sqlite:"))
            .unwrap_or(&self.path);
        let (file, params) = location.split_once('?').unwrap_or((location, ""));
        let file = file.strip_prefix("file:").unwrap_or(file);
        if file.is_empty() || file == IN_MEMORY || params.split('&').any(|p| p == "mode=memory") {
            None
        } else {
            Some(PathBuf::from(file))
        }
    }

    /// Builds the `sqlx` connect options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MigrateError::Database`] if the path is not a valid SQLite location.
    pub fn connect_options(&self) -> Result<SqliteConnectOptions> {
        Ok(SqliteConnectOptions::from_str(&self.path)?
            .read_only(self.readonly)
            .create_if_missing(self.create_if_missing && !self.readonly)
            .busy_timeout(self.busy_timeout)
            .foreign_keys(true))
    }
}
