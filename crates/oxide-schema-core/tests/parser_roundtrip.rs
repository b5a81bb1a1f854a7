//! Rendering a parsed table and parsing it again yields the same table.

mod common;
use common::*;

use oxide_schema_core::schema::{
    CURRENT_TIMESTAMP_SQL, blob, boolean, current_timestamp, decimal, foreign_key, integer,
    primary_key, real, text, timestamp,
};
use oxide_schema_core::{Column, Expr, Table, parse_expression};

fn assert_roundtrip(sql: &str) {
    let first = table(sql);
    let rendered = first.create_sql();
    let second = table(&rendered);
    assert_eq!(first, second, "rendered as:\n{rendered}");
    assert_eq!(second.create_sql(), rendered);
}

#[test]
fn roundtrip_plain_columns() {
    assert_roundtrip("CREATE TABLE t (a, b INTEGER, c VARCHAR(10), d UNSIGNED BIG INT)");
}

#[test]
fn roundtrip_constraints() {
    assert_roundtrip(
        "CREATE TABLE t (\
           id INTEGER PRIMARY KEY AUTOINCREMENT, \
           email TEXT NOT NULL UNIQUE COLLATE NOCASE CHECK(email LIKE '%@%'), \
           owner INTEGER REFERENCES people(id) ON DELETE CASCADE ON UPDATE RESTRICT, \
           score REAL DEFAULT -1.5 CONSTRAINT positive CHECK(score IS NULL OR score > 0), \
           doubled REAL GENERATED ALWAYS AS (score * 2) VIRTUAL)",
    );
}

#[test]
fn roundtrip_expressions_needing_parentheses() {
    assert_roundtrip(
        "CREATE TABLE t (\
           a INTEGER CHECK((a + 1) * 2 > 3 AND NOT (a = 4 OR a = 5)), \
           b INTEGER CHECK(b - (1 - 2) BETWEEN -(1) AND 10), \
           c TEXT CHECK(c NOT IN ('x', 'y') AND c NOT LIKE 'z%' AND length(c) < 5))",
    );
}

#[test]
fn roundtrip_case_cast_and_escape() {
    assert_roundtrip(
        "CREATE TABLE t (\
           a INTEGER CHECK (CAST(a AS TEXT) != ''), \
           b TEXT CHECK (CASE WHEN b IS NULL THEN 1 WHEN length(b) > 3 THEN 2 ELSE 0 END < 2), \
           c TEXT CHECK (CASE c WHEN 'x' THEN 1 END), \
           d TEXT CHECK (d LIKE '%!_%' ESCAPE '!' AND d NOT LIKE 'x' ESCAPE 'y'), \
           e INTEGER CHECK (e NOT NULL AND e NOTNULL))",
    );
}

#[test]
fn roundtrip_extreme_integers() {
    assert_roundtrip(
        "CREATE TABLE t (\
           a INTEGER DEFAULT -9223372036854775808, \
           b INTEGER DEFAULT 0x10 CHECK (b & 0xFF = b), \
           c REAL DEFAULT 9223372036854775808)",
    );
    let t = table("CREATE TABLE t (a INTEGER DEFAULT 0x7fffffffffffffff)");
    assert_eq!(t.columns()[0].default, Some(Expr::literal(i64::MAX)));
    assert!(t.create_sql().contains("DEFAULT 9223372036854775807"));
}

#[test]
fn roundtrip_quoted_names_and_options() {
    assert_roundtrip(
        "CREATE TABLE \"order items\" (\"order\" INTEGER, \"weird \"\"name\" TEXT, \
         PRIMARY KEY (\"order\")) WITHOUT ROWID, STRICT",
    );
}

#[test]
fn roundtrip_factory_columns() {
    let columns: Vec<Column> = vec![
        primary_key("id").into(),
        text("title").required().into(),
        text("status").choices(["draft", "published"]).into(),
        text("kind").required().choices(["a", "b"]).into(),
        integer("rank").choices([1_i64, 2, 3]).into(),
        integer("age").required().min(0).max(120).into(),
        real("weight").default(-2.5).into(),
        decimal("price").required().into(),
        boolean("active").default(true).into(),
        blob("avatar").into(),
        foreign_key("owner", "people").into(),
        timestamp("seen_at").default_expr(current_timestamp()).into(),
    ];
    let declared = Table::new("things", columns).unwrap();
    let reparsed = table(&declared.create_sql());
    assert_eq!(declared, reparsed);
}

#[test]
fn current_timestamp_sql_parses_to_helper() {
    assert_eq!(parse_expression(CURRENT_TIMESTAMP_SQL).unwrap(), current_timestamp());
    assert_eq!(current_timestamp().to_string(), CURRENT_TIMESTAMP_SQL);
}

#[test]
fn negative_literal_rendering() {
    let expr = parse_expression("-(1)").unwrap();
    assert_eq!(parse_expression(&expr.to_string()).unwrap(), expr);
    let expr = parse_expression("- -1").unwrap();
    assert_eq!(parse_expression(&expr.to_string()).unwrap(), expr);
    assert_eq!(parse_expression("-1").unwrap(), Expr::literal(-1_i64));
}

#[test]
fn unsupported_syntax_is_an_error() {
    for sql in [
        "CREATE TABLE t AS SELECT * FROM u",
        "CREATE TABLE t (a INTEGER PRIMARY KEY ON CONFLICT REPLACE)",
        "CREATE TABLE t (a INTEGER REFERENCES u MATCH FULL)",
        "CREATE TABLE t (a INTEGER REFERENCES u DEFERRABLE INITIALLY DEFERRED)",
    ] {
        let err = parse_err(sql);
        assert!(err.message.starts_with("Unsupported syntax"), "{sql}: {err}");
    }
}

#[test]
fn malformed_sql_is_an_error() {
    for sql in [
        "",
        "CREATE TABLE",
        "CREATE TABLE t ()",
        "CREATE TABLE t (a TEXT",
        "CREATE TABLE t (a TEXT CHECK(a >))",
        "CREATE TABLE t (a TEXT) garbage",
        "CREATE TABLE t (a 'unterminated)",
    ] {
        let _ = parse_err(sql);
    }
}
