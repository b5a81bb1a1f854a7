//! Column factories.
//!
//! Each factory returns a [`ColumnBuilder`] preconfigured for one column kind:
//!
//! ```rust
//! use oxide_schema_core::schema::{integer, text};
//!
//! let name = text("name").required().build();
//! assert_eq!(name.to_string(), "name TEXT NOT NULL CHECK(name != '')");
//!
//! let age = integer("age").max(100).build();
//! assert_eq!(age.to_string(), "age INTEGER CHECK(age <= 100)");
//! ```

use crate::ast::{BinaryOp, Constraint, Expr, ForeignKey, ForeignKeyAction, Literal};

use super::{Column, SqlType};

/// SQL text of a UTC timestamp with microseconds and an explicit offset.
pub const CURRENT_TIMESTAMP_SQL: &str = "STRFTIME('%Y-%m-%d %H:%M:%f000+00:00', 'now')";

/// Returns the expression for [`CURRENT_TIMESTAMP_SQL`].
#[must_use]
pub fn current_timestamp() -> Expr {
    Expr::call(
        "STRFTIME",
        vec![
            Expr::literal("%Y-%m-%d %H:%M:%f000+00:00"),
            Expr::literal("now"),
        ],
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text,
    Plain,
    PrimaryKey,
}

/// Fluent builder for declared columns.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    name: String,
    sql_type: SqlType,
    kind: Kind,
    required: bool,
    choices: Vec<Literal>,
    default: Option<Expr>,
    min: Option<i64>,
    max: Option<i64>,
    references: Option<ForeignKey>,
    extra: Vec<Constraint>,
}

impl ColumnBuilder {
    fn new(name: impl Into<String>, sql_type: SqlType, kind: Kind) -> Self {
        Self {
            name: name.into(),
            sql_type,
            kind,
            required: false,
            choices: Vec::new(),
            default: None,
            min: None,
            max: None,
            references: None,
            extra: Vec::new(),
        }
    }

    /// Marks the column as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts the column to a fixed set of values.
    #[must_use]
    pub fn choices<I, L>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(Expr::Literal(value.into()));
        self
    }

    /// Sets an expression default value, rendered as `DEFAULT (expr)`.
    #[must_use]
    pub fn default_expr(mut self, expr: Expr) -> Self {
        self.default = Some(expr);
        self
    }

    /// Sets an inclusive lower bound, enforced with a `CHECK` constraint.
    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Sets an inclusive upper bound, enforced with a `CHECK` constraint.
    #[must_use]
    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Overrides the `ON DELETE` action of a foreign key column.
    #[must_use]
    pub fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        if let Some(fk) = self.references.take() {
            self.references = Some(fk.on_delete(action));
        }
        self
    }

    /// Appends an arbitrary constraint after the generated ones.
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.extra.push(constraint);
        self
    }

    fn compare(&self, op: BinaryOp, value: impl Into<Literal>) -> Expr {
        Expr::infix(op, Expr::ident(&self.name), Expr::literal(value))
    }

    fn choices_check(&self) -> Expr {
        Expr::infix(
            BinaryOp::In,
            Expr::ident(&self.name),
            Expr::List(self.choices.iter().cloned().map(Expr::Literal).collect()),
        )
    }

    /// Builds the column.
    #[must_use]
    pub fn build(self) -> Column {
        let mut constraints = Vec::new();
        let mut default = self.default.clone();

        match self.kind {
            Kind::PrimaryKey => constraints.push(Constraint::PrimaryKey {
                order: None,
                autoincrement: true,
            }),
            Kind::Text => {
                // Text is never NULL: an absent value is stored as ''.
                constraints.push(Constraint::NotNull);
                if self.required {
                    constraints.push(Constraint::Check(self.compare(BinaryOp::NotEq, "")));
                } else if default.is_none() {
                    default = Some(Expr::literal(""));
                }
                if !self.choices.is_empty() {
                    let check = if self.required {
                        self.choices_check()
                    } else {
                        Expr::infix(
                            BinaryOp::Or,
                            self.compare(BinaryOp::Eq, ""),
                            self.choices_check(),
                        )
                    };
                    constraints.push(Constraint::Check(check));
                }
            }
            Kind::Plain => {
                if self.required {
                    constraints.push(Constraint::NotNull);
                }
                if !self.choices.is_empty() {
                    let check = if self.required {
                        self.choices_check()
                    } else {
                        Expr::infix(
                            BinaryOp::Or,
                            self.compare(BinaryOp::Is, Literal::Null),
                            self.choices_check(),
                        )
                    };
                    constraints.push(Constraint::Check(check));
                }
            }
        }

        if let Some(max) = self.max {
            constraints.push(Constraint::Check(self.compare(BinaryOp::LtEq, max)));
        }
        if let Some(min) = self.min {
            constraints.push(Constraint::Check(self.compare(BinaryOp::GtEq, min)));
        }
        if let Some(fk) = &self.references {
            constraints.push(Constraint::ForeignKey(fk.clone()));
        }
        constraints.extend(self.extra);

        Column {
            name: self.name,
            sql_type: self.sql_type,
            default,
            constraints,
            required: self.required || self.kind == Kind::PrimaryKey,
            choices: self.choices,
            min: self.min,
            max: self.max,
        }
    }
}

impl From<ColumnBuilder> for Column {
    fn from(builder: ColumnBuilder) -> Self {
        builder.build()
    }
}

/// Creates a `TEXT` column. Optional text columns default to `''`.
#[must_use]
pub fn text(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Text, Kind::Text)
}

/// Creates an `INTEGER` column.
#[must_use]
pub fn integer(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Integer, Kind::Plain)
}

/// Creates a `REAL` column.
#[must_use]
pub fn real(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Real, Kind::Plain)
}

/// Creates a `BLOB` column.
#[must_use]
pub fn blob(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Blob, Kind::Plain)
}

/// Creates a `BOOLEAN` column.
#[must_use]
pub fn boolean(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Boolean, Kind::Plain)
}

/// Creates a `DATE` column.
#[must_use]
pub fn date(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Date, Kind::Plain)
}

/// Creates a `TIME` column.
#[must_use]
pub fn time(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Time, Kind::Plain)
}

/// Creates a `TIMESTAMP` column.
#[must_use]
pub fn timestamp(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Timestamp, Kind::Plain)
}

/// Creates a `DECIMAL` column.
#[must_use]
pub fn decimal(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Decimal, Kind::Plain)
}

/// Creates an `INTEGER` column referencing `table`, with `ON DELETE SET NULL`.
#[must_use]
pub fn foreign_key(name: impl Into<String>, table: impl Into<String>) -> ColumnBuilder {
    let mut builder = ColumnBuilder::new(name, SqlType::Integer, Kind::Plain);
    builder.references = Some(ForeignKey::new(table).on_delete(ForeignKeyAction::SetNull));
    builder
}

/// Creates an `INTEGER PRIMARY KEY AUTOINCREMENT` column.
#[must_use]
pub fn primary_key(name: impl Into<String>) -> ColumnBuilder {
    ColumnBuilder::new(name, SqlType::Integer, Kind::PrimaryKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_columns() {
        assert_eq!(
            text("name").build().to_string(),
            "name TEXT DEFAULT '' NOT NULL"
        );
        assert_eq!(
            text("name").required().build().to_string(),
            "name TEXT NOT NULL CHECK(name != '')"
        );
        assert_eq!(
            text("kind").choices(["a", "b"]).build().to_string(),
            "kind TEXT DEFAULT '' NOT NULL CHECK(kind = '' OR kind IN ('a', 'b'))"
        );
    }

    #[test]
    fn test_integer_bounds() {
        let column = integer("age").min(18).max(65).default(40_i64).required().build();
        assert_eq!(
            column.to_string(),
            "age INTEGER DEFAULT 40 NOT NULL CHECK(age <= 65) CHECK(age >= 18)"
        );
        assert_eq!(
            column.description(),
            "age (integer, min = 18, max = 65, default = 40)"
        );
    }

    #[test]
    fn test_optional_choices() {
        let column = integer("level").choices([1_i64, 2]).build();
        assert_eq!(
            column.to_string(),
            "level INTEGER CHECK(level IS NULL OR level IN (1, 2))"
        );
    }

    #[test]
    fn test_foreign_key_column() {
        let column = foreign_key("owner", "users").required().build();
        assert_eq!(
            column.to_string(),
            "owner INTEGER NOT NULL REFERENCES users ON DELETE SET NULL"
        );
        assert_eq!(column.description(), "owner (integer, foreign key = users)");

        let cascade = foreign_key("owner", "users")
            .on_delete(ForeignKeyAction::Cascade)
            .build();
        assert_eq!(
            cascade.to_string(),
            "owner INTEGER REFERENCES users ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_primary_key() {
        let column = primary_key("id").build();
        assert_eq!(column.to_string(), "id INTEGER PRIMARY KEY AUTOINCREMENT");
        assert!(column.is_primary_key());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(text("name").build().description(), "name (text, optional)");
        assert_eq!(
            text("kind").choices(["x"]).default("x").build().description(),
            "kind (text, optional, choices = ['x'], default = 'x')"
        );
        assert_eq!(boolean("done").build().description(), "done (boolean, optional)");
    }

    #[test]
    fn test_current_timestamp_expression() {
        assert_eq!(current_timestamp().to_string(), CURRENT_TIMESTAMP_SQL);
        let column = timestamp("seen_at").default_expr(current_timestamp()).build();
        assert_eq!(
            column.to_string(),
            format!("seen_at TIMESTAMP DEFAULT ({CURRENT_TIMESTAMP_SQL})")
        );
    }
}
