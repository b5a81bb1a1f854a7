//! DDL lexer.
//!
//! A hand-written lexer for the subset of SQLite needed to read `CREATE TABLE` statements
//! back out of `sqlite_master`.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind, is_reserved_word};
pub use tokenizer::Lexer;
