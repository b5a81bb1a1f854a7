//! Column renaming.
//!
//! Renaming a column has to reach into its own definition: a `CHECK(name != '')` or a
//! generated expression refers to the column by name, and so can a self-referencing
//! `FOREIGN KEY` column list. Nothing outside the column is touched, so foreign keys in other
//! tables that point at it are left alone.

use crate::ast::{Constraint, Expr, ForeignKey, FunctionCall};
use crate::schema::Column;

/// Returns a copy of `column` with every reference to `old` replaced by `new`.
///
/// Always succeeds. If `old` appears nowhere the result equals the input, except that the
/// column's own name is still set when it was `old`.
#[must_use]
pub fn rename_column(column: &Column, old: &str, new: &str) -> Column {
    Column {
        name: rename_name(&column.name, old, new),
        default: column.default.as_ref().map(|expr| rename_expr(expr, old, new)),
        constraints: column
            .constraints
            .iter()
            .map(|constraint| rename_constraint(constraint, old, new))
            .collect(),
        ..column.clone()
    }
}

fn rename_name(name: &str, old: &str, new: &str) -> String {
    if name == old { new } else { name }.to_string()
}

fn rename_constraint(constraint: &Constraint, old: &str, new: &str) -> Constraint {
    match constraint {
        Constraint::Check(expr) => Constraint::Check(rename_expr(expr, old, new)),
        Constraint::Generated { expr, stored } => Constraint::Generated {
            expr: rename_expr(expr, old, new),
            stored: *stored,
        },
        Constraint::ForeignKey(fk) => Constraint::ForeignKey(ForeignKey {
            columns: fk
                .columns
                .iter()
                .map(|name| rename_name(name, old, new))
                .collect(),
            ..fk.clone()
        }),
        Constraint::Named { name, constraint } => Constraint::Named {
            name: name.clone(),
            constraint: Box::new(rename_constraint(constraint, old, new)),
        },
        Constraint::NotNull
        | Constraint::Unique
        | Constraint::PrimaryKey { .. }
        | Constraint::Collate(_) => constraint.clone(),
    }
}

fn rename_boxed(expr: &Expr, old: &str, new: &str) -> Box<Expr> {
    Box::new(rename_expr(expr, old, new))
}

fn rename_expr(expr: &Expr, old: &str, new: &str) -> Expr {
    match expr {
        Expr::Identifier(name) => Expr::Identifier(rename_name(name, old, new)),
        Expr::Infix { op, left, right } => Expr::Infix {
            op: *op,
            left: rename_boxed(left, old, new),
            right: rename_boxed(right, old, new),
        },
        Expr::Unary { op, operand } => Expr::Unary {
            op: *op,
            operand: rename_boxed(operand, old, new),
        },
        Expr::List(items) => Expr::List(
            items
                .iter()
                .map(|item| rename_expr(item, old, new))
                .collect(),
        ),
        // Function names live in their own namespace.
        Expr::Function(call) => Expr::Function(FunctionCall {
            name: call.name.clone(),
            args: call
                .args
                .iter()
                .map(|arg| rename_expr(arg, old, new))
                .collect(),
        }),
        Expr::Between {
            expr,
            low,
            high,
            negated,
        } => Expr::Between {
            expr: rename_boxed(expr, old, new),
            low: rename_boxed(low, old, new),
            high: rename_boxed(high, old, new),
            negated: *negated,
        },
        Expr::Collate { expr, collation } => Expr::Collate {
            expr: rename_boxed(expr, old, new),
            collation: collation.clone(),
        },
        Expr::LikeEscape {
            expr,
            pattern,
            escape,
            negated,
        } => Expr::LikeEscape {
            expr: rename_boxed(expr, old, new),
            pattern: rename_boxed(pattern, old, new),
            escape: rename_boxed(escape, old, new),
            negated: *negated,
        },
        Expr::Case {
            operand,
            when_clauses,
            else_clause,
        } => Expr::Case {
            operand: operand.as_deref().map(|e| rename_boxed(e, old, new)),
            when_clauses: when_clauses
                .iter()
                .map(|(when, then)| (rename_expr(when, old, new), rename_expr(then, old, new)))
                .collect(),
            else_clause: else_clause.as_deref().map(|e| rename_boxed(e, old, new)),
        },
        Expr::Cast { expr, data_type } => Expr::Cast {
            expr: rename_boxed(expr, old, new),
            data_type: data_type.clone(),
        },
        Expr::Literal(_) => expr.clone(),
    }
}
