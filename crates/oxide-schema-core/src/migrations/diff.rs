//! Schema differ.
//!
//! Compares a live schema with a declared one and produces the operations that turn the first
//! into the second. Differences are only classified here; nothing fails on an ordinary
//! structural change.
//!
//! Rename detection is positional: a new column is only considered a rename of the old column
//! at the same index. A rename combined with a reorder in the same change is therefore reported
//! as an add plus a drop, which loses that column's data when applied.

use std::collections::{HashMap, HashSet};

use super::operation::{Diff, MigrateOperation};
use super::rename::rename_column;
use crate::schema::{Schema, Table};

// ================================================================
// Schemas
// ================================================================

/// Returns the operations that turn `old` into `new`.
///
/// Creates come first, then drops, then the changes to tables present in both, in `new`'s
/// declaration order.
#[must_use]
pub fn diff_schemas(old: &Schema, new: &Schema, detect_renaming: bool) -> Diff {
    let mut diff = Diff::new();

    for table in new.tables() {
        if !old.contains(&table.name) {
            diff.push(MigrateOperation::create_table(table));
        }
    }

    for table in old.tables() {
        if !new.contains(&table.name) {
            diff.push(MigrateOperation::drop_table(&table.name));
        }
    }

    for table in new.tables() {
        if let Some(existing) = old.table(&table.name) {
            diff.extend(diff_tables(existing, table, detect_renaming));
        }
    }

    diff
}

/// Diffs a single declared table against a live schema.
///
/// A table missing from `live` is created. Other live tables are ignored.
#[must_use]
pub fn diff_table_against(live: &Schema, table: &Table, detect_renaming: bool) -> Diff {
    live.table(&table.name).map_or_else(
        || Diff::from(vec![MigrateOperation::create_table(table)]),
        |existing| diff_tables(existing, table, detect_renaming),
    )
}

// ================================================================
// Tables
// ================================================================

/// Returns the operations that turn table `old` into table `new`.
///
/// Column operations are named after `new`. A `ReorderColumns`, if any, is always last and
/// lists every column of `new`.
#[must_use]
pub fn diff_tables(old: &Table, new: &Table, detect_renaming: bool) -> Diff {
    let mut diff = Diff::new();
    let table = new.name.as_str();

    let old_index: HashMap<&str, usize> = old
        .columns()
        .iter()
        .enumerate()
        .map(|(i, c)| (c.name.as_str(), i))
        .collect();
    let new_names: HashSet<&str> = new.columns().iter().map(|c| c.name.as_str()).collect();

    let mut renamed: HashSet<&str> = HashSet::new();
    let mut reordered = false;

    for (new_position, column) in new.columns().iter().enumerate() {
        match old_index.get(column.name.as_str()) {
            Some(&old_position) => {
                if old_position != new_position {
                    reordered = true;
                }
                if old.columns()[old_position] != *column {
                    diff.push(MigrateOperation::alter_column(table, column.clone()));
                }
            }
            None => {
                // Only the old column at the same position is a rename candidate.
                let candidate = old
                    .columns()
                    .get(new_position)
                    .filter(|_| detect_renaming)
                    .filter(|candidate| !new_names.contains(candidate.name.as_str()))
                    .filter(|candidate| {
                        rename_column(candidate, &candidate.name, &column.name) == *column
                    });
                if let Some(candidate) = candidate {
                    renamed.insert(candidate.name.as_str());
                    diff.push(MigrateOperation::rename_column(
                        table,
                        &candidate.name,
                        &column.name,
                    ));
                } else {
                    diff.push(MigrateOperation::add_column(table, column.clone()));
                }
            }
        }
    }

    let mut dropped: HashSet<&str> = HashSet::new();
    for column in old.columns() {
        let name = column.name.as_str();
        if !new_names.contains(name) && !renamed.contains(name) {
            dropped.insert(name);
            diff.push(MigrateOperation::drop_column(table, name));
        }
    }

    if reordered {
        let remaining: Vec<&str> = old
            .column_names()
            .into_iter()
            .filter(|name| !dropped.contains(name))
            .collect();
        let new_order = new.column_names();
        if remaining != new_order {
            diff.push(MigrateOperation::reorder_columns(table, new_order));
        }
    }

    diff
}

// ================================================================
// Tests
// ================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_column, parse_create_table};
    use crate::schema::Column;

    fn col(sql: &str) -> Column {
        parse_column(sql).unwrap()
    }

    fn table(name: &str, columns: &[&str]) -> Table {
        Table::new(name, columns.iter().map(|sql| col(sql)).collect()).unwrap()
    }

    #[test]
    fn test_identical_tables() {
        let t = table("people", &["id INTEGER PRIMARY KEY", "name TEXT NOT NULL"]);
        assert!(diff_tables(&t, &t, true).is_empty());
    }

    #[test]
    fn test_appended_columns_are_added_in_order() {
        let old = table("people", &["id INTEGER", "name TEXT"]);
        let new = table("people", &["id INTEGER", "name TEXT", "age INTEGER", "email TEXT"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![
                MigrateOperation::add_column("people", col("age INTEGER")),
                MigrateOperation::add_column("people", col("email TEXT")),
            ]
        );
    }

    #[test]
    fn test_changed_definition_is_altered() {
        let old = table("people", &["id INTEGER", "age INTEGER"]);
        let new = table("people", &["id INTEGER", "age INTEGER NOT NULL DEFAULT 0"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![MigrateOperation::alter_column(
                "people",
                col("age INTEGER NOT NULL DEFAULT 0")
            )]
        );
    }

    #[test]
    fn test_formatting_differences_are_ignored() {
        let old = parse_create_table("create table t (a integer check ((a>0)), b text)").unwrap();
        let new = parse_create_table("CREATE TABLE \"t\" (\"a\" INTEGER CHECK (a > 0), b TEXT)")
            .unwrap();
        assert!(diff_tables(&old, &new, true).is_empty());
    }

    #[test]
    fn test_rename_is_detected() {
        let old = table("people", &["id INTEGER", "name TEXT NOT NULL CHECK(name != '')"]);
        let new = table(
            "people",
            &["id INTEGER", "legal_name TEXT NOT NULL CHECK(legal_name != '')"],
        );
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![MigrateOperation::rename_column("people", "name", "legal_name")]
        );
    }

    #[test]
    fn test_rename_detection_can_be_disabled() {
        let old = table("people", &["id INTEGER", "name TEXT"]);
        let new = table("people", &["id INTEGER", "legal_name TEXT"]);
        assert_eq!(
            diff_tables(&old, &new, false),
            vec![
                MigrateOperation::add_column("people", col("legal_name TEXT")),
                MigrateOperation::drop_column("people", "name"),
            ]
        );
    }

    #[test]
    fn test_rename_requires_equal_definition() {
        let old = table("people", &["id INTEGER", "name TEXT"]);
        let new = table("people", &["id INTEGER", "legal_name INTEGER"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![
                MigrateOperation::add_column("people", col("legal_name INTEGER")),
                MigrateOperation::drop_column("people", "name"),
            ]
        );
    }

    #[test]
    fn test_rename_only_tries_same_position() {
        // `name` moved to the front and was renamed at the same time.
        let old = table("people", &["id INTEGER", "name TEXT"]);
        let new = table("people", &["legal_name TEXT", "id INTEGER"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![
                MigrateOperation::add_column("people", col("legal_name TEXT")),
                MigrateOperation::drop_column("people", "name"),
                MigrateOperation::reorder_columns("people", ["legal_name", "id"]),
            ]
        );
    }

    #[test]
    fn test_candidate_still_present_is_not_renamed() {
        let old = table("t", &["a TEXT", "b TEXT"]);
        let new = table("t", &["c TEXT", "a TEXT"]);
        let diff = diff_tables(&old, &new, true);
        assert_eq!(diff.operations()[0], MigrateOperation::add_column("t", col("c TEXT")));
    }

    #[test]
    fn test_permutation_is_a_single_reorder() {
        let old = table("t", &["a INTEGER", "b TEXT", "c REAL"]);
        let new = table("t", &["c REAL", "a INTEGER", "b TEXT"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![MigrateOperation::reorder_columns("t", ["c", "a", "b"])]
        );
    }

    #[test]
    fn test_drop_that_shifts_columns_is_not_a_reorder() {
        let old = table("t", &["a INTEGER", "b TEXT", "c REAL"]);
        let new = table("t", &["b TEXT", "c REAL"]);
        assert_eq!(
            diff_tables(&old, &new, true),
            vec![MigrateOperation::drop_column("t", "a")]
        );
    }

    #[test]
    fn test_schema_creates_then_drops_then_changes() {
        let old = Schema::new(vec![
            table("x", &["a INTEGER"]),
            table("y", &["a INTEGER"]),
        ])
        .unwrap();
        let new = Schema::new(vec![
            table("y", &["a INTEGER", "b TEXT"]),
            table("z", &["a INTEGER"]),
        ])
        .unwrap();
        assert_eq!(
            diff_schemas(&old, &new, true),
            vec![
                MigrateOperation::create_table(&table("z", &["a INTEGER"])),
                MigrateOperation::drop_table("x"),
                MigrateOperation::add_column("y", col("b TEXT")),
            ]
        );
    }

    #[test]
    fn test_table_against_live_schema() {
        let live = Schema::new(vec![table("x", &["a INTEGER"])]).unwrap();
        let declared = table("y", &["a INTEGER"]);
        assert_eq!(
            diff_table_against(&live, &declared, true),
            vec![MigrateOperation::create_table(&declared)]
        );
        let declared = table("x", &["a INTEGER", "b TEXT"]);
        assert_eq!(
            diff_table_against(&live, &declared, true),
            vec![MigrateOperation::add_column("x", col("b TEXT"))]
        );
    }
}
