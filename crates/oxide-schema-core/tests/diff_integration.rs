//! Integration tests for the schema differ.

mod common;
use common::*;

use oxide_schema_core::schema::{date, foreign_key, integer, text};
use oxide_schema_core::{AutoTable, MigrateOperation, Schema, diff_schemas, diff_tables};

// =============================================================================
// Declared schemas
// =============================================================================

fn people_v1() -> Schema {
    Schema::new(vec![
        AutoTable::new(
            "people",
            vec![
                text("name").required().into(),
                integer("age").min(0).into(),
                text("role").choices(["admin", "user"]).into(),
            ],
        )
        .unwrap(),
        AutoTable::new(
            "pets",
            vec![
                text("name").required().into(),
                foreign_key("owner", "people").into(),
            ],
        )
        .unwrap(),
    ])
    .unwrap()
}

// =============================================================================
// Reflexivity
// =============================================================================

#[test]
fn declared_schema_matches_its_own_sql() {
    let declared = people_v1();
    let reparsed = schema(&declared.to_string());
    assert!(diff_schemas(&reparsed, &declared, true).is_empty());
    assert!(diff_schemas(&declared, &reparsed, true).is_empty());
}

#[test]
fn sqlite_formatting_is_not_a_change() {
    let live = schema(
        "CREATE TABLE \"people\"(\n  \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \
         \"name\" TEXT NOT NULL CHECK((\"name\" <> '')),\n  age integer DEFAULT (30)\n)",
    );
    let declared = schema(
        "CREATE TABLE people (id INTEGER PRIMARY KEY AUTOINCREMENT, \
         name TEXT NOT NULL CHECK(name != ''), age INTEGER DEFAULT 30)",
    );
    assert!(diff_schemas(&live, &declared, true).is_empty());
}

// =============================================================================
// Table-level behavior
// =============================================================================

#[test]
fn add_only() {
    let old = table("CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT)");
    let new = table("CREATE TABLE t (id INTEGER PRIMARY KEY, a TEXT, b INTEGER, c REAL NOT NULL DEFAULT 0.5)");
    let diff = diff_tables(&old, &new, true);
    assert_eq!(
        diff,
        vec![
            MigrateOperation::add_column("t", col("b INTEGER")),
            MigrateOperation::add_column("t", col("c REAL NOT NULL DEFAULT 0.5")),
        ]
    );
}

#[test]
fn rename_over_add_and_drop() {
    let old = table("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL)");
    let new = table("CREATE TABLE people (id INTEGER PRIMARY KEY, legal_name TEXT NOT NULL)");
    assert_eq!(
        diff_tables(&old, &new, true),
        vec![MigrateOperation::rename_column("people", "name", "legal_name")]
    );
}

#[test]
fn reorder_only() {
    let old = table("CREATE TABLE t (a INTEGER, b TEXT, c REAL, d BLOB)");
    let new = table("CREATE TABLE t (d BLOB, b TEXT, a INTEGER, c REAL)");
    assert_eq!(
        diff_tables(&old, &new, true),
        vec![MigrateOperation::reorder_columns("t", ["d", "b", "a", "c"])]
    );
}

#[test]
fn column_inserted_before_existing_one() {
    let old = AutoTable::new("events", vec![date("start").into()]).unwrap();
    let new = AutoTable::new("events", vec![date("end").into(), date("start").into()]).unwrap();

    let diff = diff_tables(&old, &new, true);
    assert_eq!(
        diff,
        vec![
            MigrateOperation::add_column("events", col("end DATE")),
            MigrateOperation::reorder_columns(
                "events",
                ["id", "end", "start", "created_at", "last_updated_at"]
            ),
        ]
    );
    let lines: Vec<String> = diff.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "Add column: end DATE",
            "Reorder columns: id, end, start, created_at, last_updated_at",
        ]
    );
}

#[test]
fn mixed_changes_keep_reorder_last() {
    let old = table("CREATE TABLE t (a INTEGER, b TEXT, c REAL)");
    let new = table("CREATE TABLE t (c REAL NOT NULL, a INTEGER, x TEXT)");
    let diff = diff_tables(&old, &new, false);
    assert_eq!(
        diff,
        vec![
            MigrateOperation::alter_column("t", col("c REAL NOT NULL")),
            MigrateOperation::add_column("t", col("x TEXT")),
            MigrateOperation::drop_column("t", "b"),
            MigrateOperation::reorder_columns("t", ["c", "a", "x"]),
        ]
    );
}

// =============================================================================
// Schema-level behavior
// =============================================================================

#[test]
fn dropped_table() {
    let old = schema("CREATE TABLE x (a INTEGER); CREATE TABLE y (a INTEGER);");
    let new = schema("CREATE TABLE y (a INTEGER);");
    assert_eq!(
        diff_schemas(&old, &new, true),
        vec![MigrateOperation::drop_table("x")]
    );
}

#[test]
fn new_table_carries_full_definition() {
    let old = Schema::default();
    let new = people_v1();
    let diff = diff_schemas(&old, &new, true);
    assert_eq!(diff.len(), 2);
    let MigrateOperation::CreateTable { name, columns, .. } = &diff.operations()[0] else {
        panic!("expected CreateTable");
    };
    assert_eq!(name, "people");
    assert_eq!(columns, new.tables()[0].columns());
    assert_eq!(diff.summary(), "Would have performed 2 operation(s) on 2 table(s).");
}

#[test]
fn evolving_declared_schema() {
    let old = people_v1();
    let new = Schema::new(vec![AutoTable::new(
        "people",
        vec![
            text("legal_name").required().into(),
            integer("age").min(0).max(150).into(),
            text("role").choices(["admin", "user"]).into(),
        ],
    )
    .unwrap()])
    .unwrap();

    let lines: Vec<String> = diff_schemas(&old, &new, true)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        lines,
        vec![
            "Drop table pets",
            "Rename column: name => legal_name",
            "Alter column: age INTEGER CHECK(age <= 150) CHECK(age >= 0)",
        ]
    );
}
