#![allow(dead_code)]

use oxide_schema_core::{Column, Schema, parse_column};
use oxide_schema_sqlite::Database;

pub fn col(sql: &str) -> Column {
    parse_column(sql).unwrap_or_else(|e| panic!("Failed to parse column: {sql}\nError: {e:?}"))
}

pub fn schema(sql: &str) -> Schema {
    Schema::from_sql(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

/// Opens an in-memory database and runs `statements` against it.
pub async fn seeded(statements: &[&str]) -> Database {
    let mut db = Database::in_memory().await.unwrap();
    for sql in statements {
        db.execute(sql)
            .await
            .unwrap_or_else(|e| panic!("Failed to run: {sql}\nError: {e:?}"));
    }
    db.refresh_schema().await.unwrap();
    db
}

pub async fn count(db: &mut Database, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM \"{table}\""))
        .fetch_one(db.connection())
        .await
        .unwrap();
    n
}

pub fn columns<'a>(db: &'a Database, table: &str) -> Vec<&'a str> {
    db.schema()
        .table(table)
        .unwrap_or_else(|| panic!("No live table {table}"))
        .column_names()
}
