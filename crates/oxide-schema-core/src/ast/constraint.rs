//! Column constraint AST types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Expr, quote_identifier};

/// Foreign key referential action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// No action.
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade the operation.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation of the action.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Sort order of a column-level primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

/// A `REFERENCES` clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Local columns. Always empty for a column-level reference.
    pub columns: Vec<String>,
    /// The referenced table.
    pub foreign_table: String,
    /// The referenced columns (empty means the foreign primary key).
    pub foreign_columns: Vec<String>,
    /// Action on delete.
    pub on_delete: Option<ForeignKeyAction>,
    /// Action on update.
    pub on_update: Option<ForeignKeyAction>,
}

impl ForeignKey {
    /// Creates a reference to `foreign_table`'s primary key.
    #[must_use]
    pub fn new(foreign_table: impl Into<String>) -> Self {
        Self {
            columns: Vec::new(),
            foreign_table: foreign_table.into(),
            foreign_columns: Vec::new(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the `ON DELETE` action.
    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the `ON UPDATE` action.
    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// A column constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// `NOT NULL`
    NotNull,
    /// `UNIQUE`
    Unique,
    /// `PRIMARY KEY [ASC|DESC] [AUTOINCREMENT]`
    PrimaryKey {
        /// Declared sort order.
        order: Option<SortOrder>,
        /// Whether AUTOINCREMENT was specified.
        autoincrement: bool,
    },
    /// `CHECK(expr)`
    Check(Expr),
    /// `REFERENCES ...`
    ForeignKey(ForeignKey),
    /// `COLLATE name`
    Collate(String),
    /// `GENERATED ALWAYS AS (expr) [STORED|VIRTUAL]`
    Generated {
        /// The generating expression.
        expr: Expr,
        /// True for STORED, false for VIRTUAL.
        stored: bool,
    },
    /// `CONSTRAINT name <constraint>`
    Named {
        /// Constraint name.
        name: String,
        /// The wrapped constraint.
        constraint: Box<Constraint>,
    },
}

impl Constraint {
    /// Returns the constraint with any `CONSTRAINT name` wrappers removed.
    #[must_use]
    pub fn unnamed(&self) -> &Self {
        match self {
            Self::Named { constraint, .. } => constraint.unnamed(),
            other => other,
        }
    }

    /// Returns true for `NOT NULL`, named or not.
    #[must_use]
    pub fn is_not_null(&self) -> bool {
        matches!(self.unnamed(), Self::NotNull)
    }
}

fn write_names(f: &mut fmt::Formatter<'_>, names: &[String]) -> fmt::Result {
    f.write_str("(")?;
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&quote_identifier(name))?;
    }
    f.write_str(")")
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.columns.is_empty() {
            f.write_str("FOREIGN KEY")?;
            write_names(f, &self.columns)?;
            f.write_str(" ")?;
        }
        write!(f, "REFERENCES {}", quote_identifier(&self.foreign_table))?;
        if !self.foreign_columns.is_empty() {
            write_names(f, &self.foreign_columns)?;
        }
        if let Some(action) = self.on_delete {
            write!(f, " ON DELETE {}", action.as_sql())?;
        }
        if let Some(action) = self.on_update {
            write!(f, " ON UPDATE {}", action.as_sql())?;
        }
        Ok(())
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNull => f.write_str("NOT NULL"),
            Self::Unique => f.write_str("UNIQUE"),
            Self::PrimaryKey {
                order,
                autoincrement,
            } => {
                f.write_str("PRIMARY KEY")?;
                match order {
                    Some(SortOrder::Asc) => f.write_str(" ASC")?,
                    Some(SortOrder::Desc) => f.write_str(" DESC")?,
                    None => {}
                }
                if *autoincrement {
                    f.write_str(" AUTOINCREMENT")?;
                }
                Ok(())
            }
            Self::Check(expr) => write!(f, "CHECK({expr})"),
            Self::ForeignKey(fk) => write!(f, "{fk}"),
            Self::Collate(name) => write!(f, "COLLATE {}", quote_identifier(name)),
            Self::Generated { expr, stored } => write!(
                f,
                "GENERATED ALWAYS AS ({expr}) {}",
                if *stored { "STORED" } else { "VIRTUAL" }
            ),
            Self::Named { name, constraint } => {
                write!(f, "CONSTRAINT {} {constraint}", quote_identifier(name))
            }
        }
    }
}
