//! Token types for the DDL lexer.

use super::Span;

/// Keywords recognized by the `CREATE TABLE` grammar.
///
/// Some of these are only meaningful in a specific position (e.g. `ACTION` after `NO`) and
/// SQLite accepts them as plain identifiers elsewhere. [`Keyword::is_reserved`] separates the
/// two groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Statement
    Create,
    Table,
    Temp,
    Temporary,
    If,
    Not,
    Exists,
    As,

    // Column and table constraints
    Constraint,
    Primary,
    Key,
    Asc,
    Desc,
    Autoincrement,
    Null,
    Unique,
    Check,
    Default,
    Collate,
    References,
    Foreign,
    Generated,
    Always,
    Stored,
    Virtual,
    Conflict,
    Deferrable,
    Match,

    // Referential actions
    On,
    Delete,
    Update,
    Set,
    Cascade,
    Restrict,
    No,
    Action,

    // Operators
    And,
    Or,
    In,
    Is,
    Isnull,
    Notnull,
    Like,
    Glob,
    Between,
    Escape,

    // Expressions
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Literals
    True,
    False,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,

    // Table options
    Without,
    Strict,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let keyword = match s.to_ascii_uppercase().as_str() {
            "CREATE" => Self::Create,
            "TABLE" => Self::Table,
            "TEMP" => Self::Temp,
            "TEMPORARY" => Self::Temporary,
            "IF" => Self::If,
            "NOT" => Self::Not,
            "EXISTS" => Self::Exists,
            "AS" => Self::As,
            "CONSTRAINT" => Self::Constraint,
            "PRIMARY" => Self::Primary,
            "KEY" => Self::Key,
            "ASC" => Self::Asc,
            "DESC" => Self::Desc,
            "AUTOINCREMENT" => Self::Autoincrement,
            "NULL" => Self::Null,
            "UNIQUE" => Self::Unique,
            "CHECK" => Self::Check,
            "DEFAULT" => Self::Default,
            "COLLATE" => Self::Collate,
            "REFERENCES" => Self::References,
            "FOREIGN" => Self::Foreign,
            "GENERATED" => Self::Generated,
            "ALWAYS" => Self::Always,
            "STORED" => Self::Stored,
            "VIRTUAL" => Self::Virtual,
            "CONFLICT" => Self::Conflict,
            "DEFERRABLE" => Self::Deferrable,
            "MATCH" => Self::Match,
            "ON" => Self::On,
            "DELETE" => Self::Delete,
            "UPDATE" => Self::Update,
            "SET" => Self::Set,
            "CASCADE" => Self::Cascade,
            "RESTRICT" => Self::Restrict,
            "NO" => Self::No,
            "ACTION" => Self::Action,
            "AND" => Self::And,
            "OR" => Self::Or,
            "IN" => Self::In,
            "IS" => Self::Is,
            "ISNULL" => Self::Isnull,
            "NOTNULL" => Self::Notnull,
            "LIKE" => Self::Like,
            "GLOB" => Self::Glob,
            "BETWEEN" => Self::Between,
            "ESCAPE" => Self::Escape,
            "CASE" => Self::Case,
            "WHEN" => Self::When,
            "THEN" => Self::Then,
            "ELSE" => Self::Else,
            "END" => Self::End,
            "CAST" => Self::Cast,
            "TRUE" => Self::True,
            "FALSE" => Self::False,
            "CURRENT_TIME" => Self::CurrentTime,
            "CURRENT_DATE" => Self::CurrentDate,
            "CURRENT_TIMESTAMP" => Self::CurrentTimestamp,
            "WITHOUT" => Self::Without,
            "STRICT" => Self::Strict,
            _ => return None,
        };
        Some(keyword)
    }

    /// Returns the keyword as uppercase SQL text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Table => "TABLE",
            Self::Temp => "TEMP",
            Self::Temporary => "TEMPORARY",
            Self::If => "IF",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
            Self::As => "AS",
            Self::Constraint => "CONSTRAINT",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Autoincrement => "AUTOINCREMENT",
            Self::Null => "NULL",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
            Self::Default => "DEFAULT",
            Self::Collate => "COLLATE",
            Self::References => "REFERENCES",
            Self::Foreign => "FOREIGN",
            Self::Generated => "GENERATED",
            Self::Always => "ALWAYS",
            Self::Stored => "STORED",
            Self::Virtual => "VIRTUAL",
            Self::Conflict => "CONFLICT",
            Self::Deferrable => "DEFERRABLE",
            Self::Match => "MATCH",
            Self::On => "ON",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::No => "NO",
            Self::Action => "ACTION",
            Self::And => "AND",
            Self::Or => "OR",
            Self::In => "IN",
            Self::Is => "IS",
            Self::Isnull => "ISNULL",
            Self::Notnull => "NOTNULL",
            Self::Like => "LIKE",
            Self::Glob => "GLOB",
            Self::Between => "BETWEEN",
            Self::Escape => "ESCAPE",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::CurrentTime => "CURRENT_TIME",
            Self::CurrentDate => "CURRENT_DATE",
            Self::CurrentTimestamp => "CURRENT_TIMESTAMP",
            Self::Without => "WITHOUT",
            Self::Strict => "STRICT",
        }
    }

    /// Returns true if SQLite refuses this keyword as a bare identifier.
    ///
    /// Non-reserved keywords are accepted wherever the parser expects a name.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::Create
                | Self::Table
                | Self::Not
                | Self::Exists
                | Self::As
                | Self::Constraint
                | Self::Primary
                | Self::Autoincrement
                | Self::Null
                | Self::Unique
                | Self::Check
                | Self::Default
                | Self::Collate
                | Self::References
                | Self::Foreign
                | Self::Deferrable
                | Self::On
                | Self::Delete
                | Self::Update
                | Self::Set
                | Self::And
                | Self::Or
                | Self::In
                | Self::Is
                | Self::Isnull
                | Self::Notnull
                | Self::Between
                | Self::Escape
                | Self::Case
                | Self::When
                | Self::Then
                | Self::Else
                | Self::CurrentTime
                | Self::CurrentDate
                | Self::CurrentTimestamp
        )
    }
}

/// Words SQLite never accepts as unquoted identifiers, beyond the reserved [`Keyword`]s.
const RESERVED_WORDS: &[&str] = &[
    "ADD", "ALL", "ALTER", "COMMIT", "CROSS", "DISTINCT", "DROP", "EXCEPT", "FALSE", "FROM",
    "FULL", "GROUP", "HAVING", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "JOIN", "LEFT",
    "LIMIT", "NATURAL", "ORDER", "OUTER", "RETURNING", "RIGHT", "ROLLBACK", "SELECT", "TO",
    "TRANSACTION", "TRUE", "UNION", "USING", "VALUES", "WHERE", "WINDOW",
];

/// Returns true if `word` must be quoted to be used as an identifier.
#[must_use]
pub fn is_reserved_word(word: &str) -> bool {
    Keyword::from_str(word).is_some_and(|kw| kw.is_reserved())
        || RESERVED_WORDS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(word))
}

/// Types of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal (single-quoted).
    String(String),
    /// Blob literal (X'...').
    Blob(Vec<u8>),

    // Identifiers and keywords
    /// Identifier, with quotes removed.
    Identifier(String),
    /// SQL keyword.
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// = or ==
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The location in the source code.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("CREATE"), Some(Keyword::Create));
        assert_eq!(Keyword::from_str("create"), Some(Keyword::Create));
        assert_eq!(
            Keyword::from_str("Current_Timestamp"),
            Some(Keyword::CurrentTimestamp)
        );
        assert_eq!(Keyword::from_str("TEXT"), None);
    }

    #[test]
    fn test_keyword_round_trips_through_as_str() {
        for kw in [Keyword::Autoincrement, Keyword::No, Keyword::Without] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_reserved_words() {
        assert!(is_reserved_word("order"));
        assert!(is_reserved_word("Default"));
        assert!(is_reserved_word("check"));
        assert!(!is_reserved_word("end"));
        assert!(!is_reserved_word("key"));
        assert!(!is_reserved_word("name"));
    }

    #[test]
    fn test_token_as_keyword() {
        let table = Token::new(TokenKind::Keyword(Keyword::Table), Span::new(0, 5));
        let comma = Token::new(TokenKind::Comma, Span::new(0, 1));
        assert_eq!(table.as_keyword(), Some(Keyword::Table));
        assert_eq!(comma.as_keyword(), None);
        assert!(Token::new(TokenKind::Eof, Span::default()).is_eof());
    }
}
