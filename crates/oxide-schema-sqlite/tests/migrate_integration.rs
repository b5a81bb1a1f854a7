//! Migrations against live SQLite databases.

mod common;

use common::{col, columns, count, schema, seeded};
use oxide_schema_core::schema::{AutoTable, date};
use oxide_schema_core::{Diff, MigrateOperation, Schema};
use oxide_schema_sqlite::{Database, DatabaseOptions, MigrateError, TEMP_TABLE_PREFIX};

const PEOPLE: &str = "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)";

// ================================================================
// Convergence
// ================================================================

#[tokio::test]
async fn migrate_converges() {
    let mut db = seeded(&[
        PEOPLE,
        "CREATE TABLE pets (id INTEGER PRIMARY KEY, name TEXT)",
        "INSERT INTO people (name, age) VALUES ('Ada', 36), ('Alan', 41)",
    ])
    .await;

    let declared = schema(
        "CREATE TABLE people (
            id INTEGER PRIMARY KEY,
            legal_name TEXT,
            age INTEGER CHECK(age >= 0),
            email TEXT DEFAULT ''
        );
        CREATE TABLE cities (id INTEGER PRIMARY KEY, name TEXT NOT NULL);",
    );

    let applied = db.migrate(&declared, true).await.unwrap();
    assert!(!applied.is_empty());
    assert!(db.diff(&declared, true).is_empty());

    let mut tables = db.schema().table_names();
    tables.sort_unstable();
    assert_eq!(tables, vec!["cities", "people"]);
    assert_eq!(
        columns(&db, "people"),
        vec!["id", "legal_name", "age", "email"]
    );

    let rows: Vec<(String, i64, String)> =
        sqlx::query_as("SELECT legal_name, age, email FROM people ORDER BY id")
            .fetch_all(db.connection())
            .await
            .unwrap();
    assert_eq!(
        rows,
        vec![
            ("Ada".to_string(), 36, String::new()),
            ("Alan".to_string(), 41, String::new()),
        ]
    );
}

#[tokio::test]
async fn migrate_to_same_schema_is_a_no_op() {
    let mut db = seeded(&[PEOPLE]).await;
    let declared = db.schema().clone();
    let applied = db.migrate(&declared, true).await.unwrap();
    assert!(applied.is_empty());
}

#[tokio::test]
async fn events_scenario() {
    let old = AutoTable::new("events", vec![date("start").into()]).unwrap();
    let new = AutoTable::new("events", vec![date("end").into(), date("start").into()]).unwrap();

    let mut db = Database::in_memory().await.unwrap();
    db.migrate(&Schema::new(vec![old]).unwrap(), true)
        .await
        .unwrap();
    db.execute("INSERT INTO events (start) VALUES ('2024-03-09')")
        .await
        .unwrap();

    let declared = Schema::new(vec![new]).unwrap();
    let applied = db.migrate(&declared, true).await.unwrap();
    let lines: Vec<String> = applied.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "Add column: end DATE",
            "Reorder columns: id, end, start, created_at, last_updated_at",
        ]
    );
    assert!(db.diff(&declared, true).is_empty());

    let (end, start): (Option<String>, String) =
        sqlx::query_as("SELECT \"end\", start FROM events")
            .fetch_one(db.connection())
            .await
            .unwrap();
    assert_eq!(end, None);
    assert_eq!(start, "2024-03-09");
}

#[tokio::test]
async fn migrate_single_table() {
    let mut db = seeded(&[PEOPLE, "CREATE TABLE pets (id INTEGER PRIMARY KEY)"]).await;
    let declared = schema("CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT)");

    let applied = db
        .migrate_table(declared.table("people").unwrap(), true)
        .await
        .unwrap();
    assert_eq!(
        applied,
        vec![MigrateOperation::drop_column("people", "age")]
    );
    // Tables not named are left alone.
    assert!(db.schema().contains("pets"));
}

// ================================================================
// Failure safety
// ================================================================

#[tokio::test]
async fn failed_rebuild_leaves_database_untouched() {
    let mut db = seeded(&[
        PEOPLE,
        "INSERT INTO people (name, age) VALUES ('Ada', 36), (NULL, 41)",
    ])
    .await;
    let before = db.schema().clone();

    let err = db
        .alter_column("people", col("name TEXT NOT NULL"))
        .await
        .unwrap_err();
    assert!(matches!(err, MigrateError::Database(_)), "{err:?}");

    assert_eq!(db.schema(), &before);
    assert_eq!(count(&mut db, "people").await, 2);
    let (name,): (Option<String>,) = sqlx::query_as("SELECT name FROM people WHERE age = 41")
        .fetch_one(db.connection())
        .await
        .unwrap();
    assert_eq!(name, None);
    assert!(!db.in_transaction());
    assert!(db.foreign_keys_enabled().await.unwrap());

    db.refresh_schema().await.unwrap();
    assert!(
        db.schema()
            .table_names()
            .iter()
            .all(|name| !name.starts_with(TEMP_TABLE_PREFIX))
    );
}

#[tokio::test]
async fn dangling_foreign_key_aborts_migration() {
    let mut db = seeded(&[
        "CREATE TABLE owners (id INTEGER PRIMARY KEY, name TEXT)",
        "CREATE TABLE pets (id INTEGER PRIMARY KEY, name TEXT, owner INTEGER REFERENCES owners(id))",
        "INSERT INTO owners (id, name) VALUES (1, 'Ada')",
        "PRAGMA foreign_keys = 0",
        "INSERT INTO pets (name, owner) VALUES ('Rex', 1), ('Tom', 99)",
        "PRAGMA foreign_keys = 1",
    ])
    .await;

    let err = db.rename_column("pets", "name", "nickname").await.unwrap_err();
    match err {
        MigrateError::ForeignKeyViolation(violations) => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].table, "pets");
            assert_eq!(violations[0].parent, "owners");
            assert_eq!(violations[0].rowid, Some(2));
        }
        other => panic!("Expected a foreign key violation, got {other:?}"),
    }

    assert_eq!(columns(&db, "pets"), vec!["id", "name", "owner"]);
    assert_eq!(count(&mut db, "pets").await, 2);
    assert!(db.foreign_keys_enabled().await.unwrap());
}

#[tokio::test]
async fn rebuild_keeps_references_into_the_table() {
    let mut db = seeded(&[
        "CREATE TABLE owners (id INTEGER PRIMARY KEY, name TEXT)",
        "CREATE TABLE pets (id INTEGER PRIMARY KEY, owner INTEGER REFERENCES owners(id) ON DELETE CASCADE)",
        "INSERT INTO owners (id, name) VALUES (1, 'Ada')",
        "INSERT INTO pets (owner) VALUES (1)",
    ])
    .await;

    // Rebuilding the parent drops and recreates it, which must not cascade into pets.
    db.add_column("owners", col("email TEXT")).await.unwrap();
    db.reorder_columns("owners", &["id", "email", "name"])
        .await
        .unwrap();

    assert_eq!(count(&mut db, "pets").await, 1);
    db.execute("DELETE FROM owners").await.unwrap();
    assert_eq!(count(&mut db, "pets").await, 0);
}

#[tokio::test]
async fn missing_table_and_column() {
    let mut db = seeded(&[PEOPLE]).await;

    assert!(matches!(
        db.drop_table("nope").await,
        Err(MigrateError::TableDoesNotExist(name)) if name == "nope"
    ));
    assert!(matches!(
        db.drop_column("people", "nope").await,
        Err(MigrateError::ColumnDoesNotExist { table, column }) if table == "people" && column == "nope"
    ));
    assert!(matches!(
        db.reorder_columns("people", &["id", "name"]).await,
        Err(MigrateError::ApiMisuse(_))
    ));
    assert_eq!(columns(&db, "people"), vec!["id", "name", "age"]);
}

#[tokio::test]
async fn diff_refused_inside_transaction() {
    let mut db = seeded(&[PEOPLE]).await;
    db.begin().await.unwrap();
    let diff = Diff::from(vec![MigrateOperation::drop_column("people", "age")]);
    assert!(matches!(
        db.apply_diff(&diff).await,
        Err(MigrateError::ApiMisuse(_))
    ));
    db.commit().await.unwrap();

    db.apply_diff(&diff).await.unwrap();
    assert_eq!(columns(&db, "people"), vec!["id", "name"]);
}

#[tokio::test]
async fn raw_transaction_statements_are_refused() {
    let mut db = seeded(&[PEOPLE]).await;
    assert!(matches!(
        db.execute("BEGIN").await,
        Err(MigrateError::ApiMisuse(_))
    ));
    assert!(!db.in_transaction());

    // The engine is still in autocommit mode, so a diff applies normally.
    let diff = Diff::from(vec![MigrateOperation::drop_column("people", "age")]);
    db.apply_diff(&diff).await.unwrap();
    assert_eq!(columns(&db, "people"), vec!["id", "name"]);
}

// ================================================================
// Files on disk
// ================================================================

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let url = format!("sqlite://{}", path.display());

    let mut db = Database::connect(DatabaseOptions::new(&url)).await.unwrap();
    db.migrate(&schema(PEOPLE), true).await.unwrap();
    db.execute("INSERT INTO people (name, age) VALUES ('Ada', 36)")
        .await
        .unwrap();
    db.rename_column("people", "name", "full_name").await.unwrap();
    db.close().await.unwrap();

    let mut db = Database::connect(DatabaseOptions::new(&url).readonly(true))
        .await
        .unwrap();
    assert_eq!(columns(&db, "people"), vec!["id", "full_name", "age"]);
    assert_eq!(count(&mut db, "people").await, 1);
    assert!(matches!(
        db.drop_table("people").await,
        Err(MigrateError::Database(_))
    ));
}

#[tokio::test]
async fn stored_expressions_survive_introspection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let url = format!("sqlite://{}", path.display());

    // Written with sqlx directly so the stored text is exactly what SQLite keeps.
    let mut db = Database::connect(DatabaseOptions::new(&url)).await.unwrap();
    for sql in [
        "CREATE TABLE u (a INTEGER CHECK (CAST(a AS TEXT) != ''))",
        "CREATE TABLE v (\
           kind TEXT CHECK (CASE WHEN kind IS NULL THEN 1 ELSE length(kind) END > 0), \
           tag TEXT CHECK (tag NOT LIKE '%!%%' ESCAPE '!'), \
           n INTEGER DEFAULT -9223372036854775808 CHECK (n NOT NULL AND n & 0x10 >= 0))",
        "CREATE TABLE w (id INTEGER PRIMARY KEY)",
    ] {
        sqlx::query(sql).execute(db.connection()).await.unwrap();
    }
    sqlx::query("INSERT INTO v (kind, tag) VALUES ('x', 'y')")
        .execute(db.connection())
        .await
        .unwrap();
    db.close().await.unwrap();

    let mut db = Database::connect(DatabaseOptions::new(&url)).await.unwrap();
    assert_eq!(columns(&db, "u"), vec!["a"]);
    let v = db.schema().table("v").unwrap().clone();
    assert_eq!(v.column_names(), vec!["kind", "tag", "n"]);
    assert_eq!(
        v.column("n").unwrap().default,
        Some(oxide_schema_core::Expr::literal(i64::MIN))
    );

    // An unrelated table still migrates, and rebuilding v keeps its checks working.
    let u = db.schema().table("u").unwrap().clone();
    let declared = Schema::new(vec![u, v]).unwrap();
    let applied = db.migrate(&declared, true).await.unwrap();
    assert_eq!(applied, vec![MigrateOperation::drop_table("w")]);
    assert!(!db.schema().contains("w"));

    db.rename_column("v", "tag", "label").await.unwrap();
    assert_eq!(count(&mut db, "v").await, 1);
    let (n,): (i64,) = sqlx::query_as("SELECT n FROM v")
        .fetch_one(db.connection())
        .await
        .unwrap();
    assert_eq!(n, i64::MIN);
    assert!(
        sqlx::query("INSERT INTO v (kind, label) VALUES ('', 'a%b')")
            .execute(db.connection())
            .await
            .is_err()
    );
}

#[tokio::test]
async fn backup_before_migration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let options = DatabaseOptions::new(format!("sqlite:{}", path.display()));
    assert_eq!(options.file_path().as_deref(), Some(path.as_path()));

    let mut db = Database::connect(options).await.unwrap();
    db.migrate(&schema(PEOPLE), true).await.unwrap();
    db.close().await.unwrap();

    let copy = oxide_schema_sqlite::backup::backup(&path).unwrap();
    assert!(copy.exists());
    assert_ne!(copy, path);

    let db = Database::open(format!("sqlite:{}", copy.display()))
        .await
        .unwrap();
    assert_eq!(columns(&db, "people"), vec!["id", "name", "age"]);
}
