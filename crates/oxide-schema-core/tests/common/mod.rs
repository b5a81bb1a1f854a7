#![allow(dead_code)]

use oxide_schema_core::{Column, ParseError, Schema, Table, parse_column, parse_create_table};

pub fn col(sql: &str) -> Column {
    parse_column(sql).unwrap_or_else(|e| panic!("Failed to parse column: {sql}\nError: {e:?}"))
}

pub fn table(sql: &str) -> Table {
    parse_create_table(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn schema(sql: &str) -> Schema {
    Schema::from_sql(sql).unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parse_create_table(sql).expect_err(&format!("Expected parse error for: {sql}"))
}
