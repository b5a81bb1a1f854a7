//! Column descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{Constraint, Expr, Literal, quote_identifier};

/// Declared SQL type of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    /// `TEXT`
    Text,
    /// `INTEGER`
    Integer,
    /// `REAL`
    Real,
    /// `BLOB`
    Blob,
    /// `BOOLEAN`
    Boolean,
    /// `DATE`
    Date,
    /// `TIME`
    Time,
    /// `TIMESTAMP`
    Timestamp,
    /// `DECIMAL`
    Decimal,
    /// Any other type name, as declared. Empty for an untyped column.
    Custom(String),
}

impl SqlType {
    /// Maps a declared type name onto a known type, case-insensitively.
    #[must_use]
    pub fn from_declared(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "TEXT" => Self::Text,
            "INTEGER" => Self::Integer,
            "REAL" => Self::Real,
            "BLOB" => Self::Blob,
            "BOOLEAN" => Self::Boolean,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" => Self::Timestamp,
            "DECIMAL" => Self::Decimal,
            _ => Self::Custom(name.to_string()),
        }
    }

    /// Returns the SQL type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Decimal => "DECIMAL",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of a table, either declared in code or read back from the database.
///
/// Equality is structural: name, type, default and constraints (including nested
/// expressions) must all match. `required`, `choices`, `min` and `max` are descriptive
/// metadata and do not take part in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub sql_type: SqlType,
    /// `DEFAULT` value.
    pub default: Option<Expr>,
    /// Constraints, in declaration order.
    pub constraints: Vec<Constraint>,
    /// Whether a value must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Allowed values, empty when unrestricted.
    #[serde(default)]
    pub choices: Vec<Literal>,
    /// Inclusive lower bound for integer columns.
    #[serde(default)]
    pub min: Option<i64>,
    /// Inclusive upper bound for integer columns.
    #[serde(default)]
    pub max: Option<i64>,
}

impl Column {
    /// Creates an unconstrained column.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            default: None,
            constraints: Vec::new(),
            required: false,
            choices: Vec::new(),
            min: None,
            max: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: Expr) -> Self {
        self.default = Some(default);
        self
    }

    /// Appends a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        if constraint.is_not_null() {
            self.required = true;
        }
        self.constraints.push(constraint);
        self
    }

    /// Returns the table this column references, if any.
    #[must_use]
    pub fn foreign_table(&self) -> Option<&str> {
        self.constraints
            .iter()
            .find_map(|constraint| match constraint.unnamed() {
                Constraint::ForeignKey(fk) => Some(fk.foreign_table.as_str()),
                _ => None,
            })
    }

    /// Returns true if the column is the table's `PRIMARY KEY`.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.unnamed(), Constraint::PrimaryKey { .. }))
    }

    /// Returns true if the column is computed by `GENERATED ALWAYS AS`.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.unnamed(), Constraint::Generated { .. }))
    }

    /// Renders everything after the column name: type, default and constraints.
    #[must_use]
    pub fn definition(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if !self.sql_type.as_str().is_empty() {
            parts.push(self.sql_type.to_string());
        }
        if let Some(default) = &self.default {
            // Only literals may appear bare after DEFAULT.
            match default {
                Expr::Literal(lit) => parts.push(format!("DEFAULT {lit}")),
                expr => parts.push(format!("DEFAULT ({expr})")),
            }
        }
        parts.extend(self.constraints.iter().map(ToString::to_string));
        parts.join(" ")
    }

    /// Returns a one-line human summary, e.g. `age (integer, min = 18, default = 30)`.
    #[must_use]
    pub fn description(&self) -> String {
        let mut out = format!(
            "{} ({}",
            self.name,
            self.sql_type.as_str().to_ascii_lowercase()
        );
        if !self.required {
            out.push_str(", optional");
        }
        if !self.choices.is_empty() {
            let choices: Vec<String> = self.choices.iter().map(ToString::to_string).collect();
            out.push_str(&format!(", choices = [{}]", choices.join(", ")));
        }
        if let Some(min) = self.min {
            out.push_str(&format!(", min = {min}"));
        }
        if let Some(max) = self.max {
            out.push_str(&format!(", max = {max}"));
        }
        if let Some(table) = self.foreign_table() {
            out.push_str(&format!(", foreign key = {table}"));
        }
        match &self.default {
            Some(Expr::Literal(lit)) if lit.is_empty_string() => {}
            Some(default) => out.push_str(&format!(", default = {default}")),
            None => {}
        }
        out.push(')');
        out
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.sql_type == other.sql_type
            && self.default == other.default
            && self.constraints == other.constraints
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let definition = self.definition();
        if definition.is_empty() {
            f.write_str(&quote_identifier(&self.name))
        } else {
            write!(f, "{} {definition}", quote_identifier(&self.name))
        }
    }
}
