//! Recursive-descent parser for `CREATE TABLE` statements.

use super::error::ParseError;
use super::pratt::{
    COLLATE_BP, EQUALITY_BP, infix_binding_power, prefix_binding_power, token_to_binary_op,
    token_to_unary_op,
};
use crate::ast::{
    BinaryOp, Constraint, Expr, ForeignKey, ForeignKeyAction, Literal, SortOrder, UnaryOp,
};
use crate::lexer::{Keyword, Lexer, Span, Token, TokenKind};
use crate::schema::{Column, SqlType, Table};

/// Deepest expression nesting accepted before parsing gives up.
pub const MAX_EXPR_DEPTH: usize = 200;

/// Digits of `i64::MIN` without its sign. The lexer reads them as a float.
const I64_MIN_DIGITS: &str = "9223372036854775808";

/// One item of a column definition after the type name.
enum ColumnItem {
    Default(Expr),
    Constraint(Constraint),
    /// A bare `NULL`, which constrains nothing.
    Nothing,
}

/// DDL parser.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
            previous: Token::new(TokenKind::Eof, Span::default()),
            depth: 0,
        }
    }

    /// Parses any number of `CREATE TABLE` statements separated by semicolons.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` on the first malformed statement.
    pub fn parse_script(&mut self) -> Result<Vec<Table>, ParseError> {
        let mut tables = Vec::new();
        loop {
            while self.check(&TokenKind::Semicolon) {
                self.advance();
            }
            if self.current.is_eof() {
                return Ok(tables);
            }
            tables.push(self.parse_create_table()?);
            if !self.check(&TokenKind::Semicolon) && !self.current.is_eof() {
                return Err(self.error_here("; or end of input"));
            }
        }
    }

    /// Parses a single `CREATE TABLE` statement.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a supported `CREATE TABLE` statement.
    pub fn parse_create_table(&mut self) -> Result<Table, ParseError> {
        let start = self.current.span;
        self.expect_keyword(Keyword::Create)?;
        if self.check_keyword(Keyword::Temp) || self.check_keyword(Keyword::Temporary) {
            self.advance();
        }
        self.expect_keyword(Keyword::Table)?;
        if self.check_keyword(Keyword::If) {
            self.advance();
            self.expect_keyword(Keyword::Not)?;
            self.expect_keyword(Keyword::Exists)?;
        }

        let mut name = self.expect_name()?;
        if self.check(&TokenKind::Dot) {
            self.advance();
            name = self.expect_name()?;
        }

        if self.check_keyword(Keyword::As) {
            return Err(ParseError::unsupported(
                "CREATE TABLE ... AS SELECT",
                self.current.span,
            ));
        }

        self.expect(&TokenKind::LeftParen)?;
        let mut columns = Vec::new();
        let mut table_constraints = Vec::new();
        loop {
            if !table_constraints.is_empty() || self.starts_table_constraint() {
                table_constraints.push(self.parse_raw_table_constraint()?);
            } else {
                columns.push(self.parse_column_def()?);
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&TokenKind::RightParen)?;

        let (without_rowid, strict) = self.parse_table_options()?;

        let mut table =
            Table::new(name, columns).map_err(|e| ParseError::new(e.to_string(), start))?;
        table.table_constraints = table_constraints;
        table.without_rowid = without_rowid;
        table.strict = strict;
        Ok(table)
    }

    /// Parses `[WITHOUT ROWID] [, STRICT]` in any order.
    fn parse_table_options(&mut self) -> Result<(bool, bool), ParseError> {
        let mut without_rowid = false;
        let mut strict = false;
        loop {
            if self.check_keyword(Keyword::Without) {
                self.advance();
                let word = self.expect_name()?;
                if !word.eq_ignore_ascii_case("rowid") {
                    return Err(ParseError::unexpected(
                        "ROWID",
                        self.previous.kind.clone(),
                        self.previous.span,
                    ));
                }
                without_rowid = true;
            } else if self.check_keyword(Keyword::Strict) {
                self.advance();
                strict = true;
            } else {
                break;
            }
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok((without_rowid, strict))
    }

    fn starts_table_constraint(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Keyword(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Unique
                    | Keyword::Check
                    | Keyword::Foreign
            )
        )
    }

    /// Captures the source text of a table constraint up to the next top-level `,` or `)`.
    fn parse_raw_table_constraint(&mut self) -> Result<String, ParseError> {
        let start = self.current.span.start;
        let mut depth = 0_usize;
        loop {
            match &self.current.kind {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen if depth == 0 => break,
                TokenKind::RightParen => depth -= 1,
                TokenKind::Comma if depth == 0 => break,
                TokenKind::Eof | TokenKind::Error(_) => return Err(self.error_here(")")),
                _ => {}
            }
            self.advance();
        }
        let text = Span::new(start, self.previous.span.end).slice(self.input).trim();
        if text.is_empty() {
            return Err(self.error_here("table constraint"));
        }
        Ok(text.to_string())
    }

    /// Parses a column definition: name, optional type name, constraints.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the definition is malformed.
    pub fn parse_column_def(&mut self) -> Result<Column, ParseError> {
        let name = self.expect_name()?;
        let sql_type = self.parse_type_name()?;
        let mut column = Column::new(name, sql_type);

        while !self.check(&TokenKind::Comma)
            && !self.check(&TokenKind::RightParen)
            && !self.check(&TokenKind::Semicolon)
            && !self.current.is_eof()
        {
            match self.parse_column_item()? {
                ColumnItem::Default(expr) => column.default = Some(expr),
                ColumnItem::Constraint(constraint) => {
                    column = column.with_constraint(constraint);
                }
                ColumnItem::Nothing => {}
            }
        }
        Ok(column)
    }

    /// Parses a type name such as `TEXT`, `UNSIGNED BIG INT` or `VARCHAR(255)`.
    fn parse_type_name(&mut self) -> Result<SqlType, ParseError> {
        let mut words: Vec<String> = Vec::new();
        loop {
            match &self.current.kind {
                TokenKind::Identifier(word) => words.push(word.clone()),
                TokenKind::Keyword(kw) if !kw.is_reserved() && *kw != Keyword::Generated => {
                    words.push(self.current.span.slice(self.input).to_string());
                }
                _ => break,
            }
            self.advance();
        }

        let mut name = words.join(" ");
        if !name.is_empty() && self.check(&TokenKind::LeftParen) {
            self.advance();
            let mut sizes = Vec::new();
            loop {
                let start = self.current.span.start;
                if self.check(&TokenKind::Plus) || self.check(&TokenKind::Minus) {
                    self.advance();
                }
                match self.current.kind {
                    TokenKind::Integer(_) | TokenKind::Float(_) => self.advance(),
                    _ => return Err(self.error_here("number")),
                }
                sizes.push(
                    Span::new(start, self.previous.span.end)
                        .slice(self.input)
                        .to_string(),
                );
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(&TokenKind::RightParen)?;
            name = format!("{name}({})", sizes.join(", "));
        }

        Ok(SqlType::from_declared(&name))
    }

    fn parse_column_item(&mut self) -> Result<ColumnItem, ParseError> {
        let span = self.current.span;
        let Some(keyword) = self.current.as_keyword() else {
            return Err(self.error_here("column constraint"));
        };

        let item = match keyword {
            Keyword::Constraint => {
                self.advance();
                let name = self.expect_name()?;
                match self.parse_column_item()? {
                    ColumnItem::Constraint(constraint) => ColumnItem::Constraint(Constraint::Named {
                        name,
                        constraint: Box::new(constraint),
                    }),
                    ColumnItem::Default(_) => {
                        return Err(ParseError::unsupported("named DEFAULT", span));
                    }
                    ColumnItem::Nothing => ColumnItem::Nothing,
                }
            }
            Keyword::Primary => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let order = if self.check_keyword(Keyword::Asc) {
                    self.advance();
                    Some(SortOrder::Asc)
                } else if self.check_keyword(Keyword::Desc) {
                    self.advance();
                    Some(SortOrder::Desc)
                } else {
                    None
                };
                self.reject_conflict_clause()?;
                let autoincrement = self.check_keyword(Keyword::Autoincrement);
                if autoincrement {
                    self.advance();
                }
                ColumnItem::Constraint(Constraint::PrimaryKey {
                    order,
                    autoincrement,
                })
            }
            Keyword::Not => {
                self.advance();
                self.expect_keyword(Keyword::Null)?;
                self.reject_conflict_clause()?;
                ColumnItem::Constraint(Constraint::NotNull)
            }
            Keyword::Null => {
                self.advance();
                self.reject_conflict_clause()?;
                ColumnItem::Nothing
            }
            Keyword::Unique => {
                self.advance();
                self.reject_conflict_clause()?;
                ColumnItem::Constraint(Constraint::Unique)
            }
            Keyword::Check => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                ColumnItem::Constraint(Constraint::Check(expr))
            }
            Keyword::Default => {
                self.advance();
                ColumnItem::Default(self.parse_default()?)
            }
            Keyword::Collate => {
                self.advance();
                ColumnItem::Constraint(Constraint::Collate(self.expect_name()?))
            }
            Keyword::References => {
                ColumnItem::Constraint(Constraint::ForeignKey(self.parse_references()?))
            }
            Keyword::Generated | Keyword::As => {
                if self.check_keyword(Keyword::Generated) {
                    self.advance();
                    self.expect_keyword(Keyword::Always)?;
                }
                self.expect_keyword(Keyword::As)?;
                self.expect(&TokenKind::LeftParen)?;
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                let stored = if self.check_keyword(Keyword::Stored) {
                    self.advance();
                    true
                } else {
                    if self.check_keyword(Keyword::Virtual) {
                        self.advance();
                    }
                    false
                };
                ColumnItem::Constraint(Constraint::Generated { expr, stored })
            }
            _ => return Err(self.error_here("column constraint")),
        };
        Ok(item)
    }

    fn reject_conflict_clause(&self) -> Result<(), ParseError> {
        if self.check_keyword(Keyword::On) {
            return Err(ParseError::unsupported("ON CONFLICT", self.current.span));
        }
        Ok(())
    }

    /// Parses the value after `DEFAULT`.
    fn parse_default(&mut self) -> Result<Expr, ParseError> {
        match &self.current.kind {
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Minus | TokenKind::Plus => {
                let negate = self.check(&TokenKind::Minus);
                self.advance();
                let literal = match self.current.kind {
                    TokenKind::Integer(_) | TokenKind::Float(_) if negate => {
                        self.negated_number()
                    }
                    TokenKind::Integer(i) => Literal::Integer(i),
                    TokenKind::Float(x) => Literal::Float(x),
                    _ => return Err(self.error_here("number")),
                };
                self.advance();
                Ok(Expr::Literal(literal))
            }
            TokenKind::Identifier(word) => {
                // SQLite stores a bare word default as text.
                let word = word.clone();
                self.advance();
                Ok(Expr::Literal(Literal::String(word)))
            }
            _ => match self.parse_literal() {
                Some(literal) => Ok(Expr::Literal(literal)),
                None => Err(self.error_here("default value")),
            },
        }
    }

    /// Parses `REFERENCES table [(cols)] [ON DELETE action] [ON UPDATE action]`.
    fn parse_references(&mut self) -> Result<ForeignKey, ParseError> {
        self.expect_keyword(Keyword::References)?;
        let mut fk = ForeignKey::new(self.expect_name()?);
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            fk.foreign_columns = self.parse_name_list()?;
            self.expect(&TokenKind::RightParen)?;
        }

        loop {
            if self.check_keyword(Keyword::On) {
                self.advance();
                let on_delete = if self.check_keyword(Keyword::Delete) {
                    true
                } else if self.check_keyword(Keyword::Update) {
                    false
                } else {
                    return Err(self.error_here("DELETE or UPDATE"));
                };
                self.advance();
                let action = self.parse_foreign_key_action()?;
                if on_delete {
                    fk.on_delete = Some(action);
                } else {
                    fk.on_update = Some(action);
                }
            } else if self.check_keyword(Keyword::Match)
                || self.check_keyword(Keyword::Deferrable)
                || (self.check_keyword(Keyword::Not)
                    && self.peek_kind() == TokenKind::Keyword(Keyword::Deferrable))
            {
                return Err(ParseError::unsupported(
                    "MATCH or DEFERRABLE in foreign key",
                    self.current.span,
                ));
            } else {
                return Ok(fk);
            }
        }
    }

    fn parse_foreign_key_action(&mut self) -> Result<ForeignKeyAction, ParseError> {
        let action = match self.current.as_keyword() {
            Some(Keyword::Set) => {
                self.advance();
                if self.check_keyword(Keyword::Null) {
                    ForeignKeyAction::SetNull
                } else if self.check_keyword(Keyword::Default) {
                    ForeignKeyAction::SetDefault
                } else {
                    return Err(self.error_here("NULL or DEFAULT"));
                }
            }
            Some(Keyword::Cascade) => ForeignKeyAction::Cascade,
            Some(Keyword::Restrict) => ForeignKeyAction::Restrict,
            Some(Keyword::No) => {
                self.advance();
                if !self.check_keyword(Keyword::Action) {
                    return Err(self.error_here("ACTION"));
                }
                ForeignKeyAction::NoAction
            }
            _ => return Err(self.error_here("foreign key action")),
        };
        self.advance();
        Ok(action)
    }

    // --- Expressions ---

    /// Parses an expression using Pratt parsing.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid expression, or nests deeper than
    /// [`MAX_EXPR_DEPTH`].
    pub fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        if self.depth >= MAX_EXPR_DEPTH {
            return Err(ParseError::new(
                format!("Expression nested more than {MAX_EXPR_DEPTH} levels deep"),
                self.current.span,
            ));
        }
        self.depth += 1;
        let result = self.parse_expression_bp(min_bp);
        self.depth -= 1;
        result
    }

    fn parse_expression_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        loop {
            if self.check_keyword(Keyword::Collate) {
                if COLLATE_BP < min_bp {
                    break;
                }
                self.advance();
                let collation = self.expect_name()?;
                lhs = Expr::Collate {
                    expr: Box::new(lhs),
                    collation,
                };
                continue;
            }

            // Postfix `NOT NULL` is `IS NOT NULL`.
            if self.check_keyword(Keyword::Not)
                && self.peek_kind() == TokenKind::Keyword(Keyword::Null)
            {
                if EQUALITY_BP.0 < min_bp {
                    break;
                }
                self.advance();
                self.advance();
                lhs = Expr::infix(BinaryOp::IsNot, lhs, Expr::Literal(Literal::Null));
                continue;
            }

            // NOT IN, NOT LIKE, NOT GLOB and NOT BETWEEN need one token of lookahead.
            let negated = self.check_keyword(Keyword::Not)
                && matches!(
                    self.peek_kind(),
                    TokenKind::Keyword(
                        Keyword::In | Keyword::Like | Keyword::Glob | Keyword::Between
                    )
                );
            let (l_bp, r_bp) = if negated {
                EQUALITY_BP
            } else {
                match infix_binding_power(&self.current.kind) {
                    Some(bp) => bp,
                    None => break,
                }
            };
            if l_bp < min_bp {
                break;
            }
            if negated {
                self.advance();
            }

            lhs = match self.current.as_keyword() {
                Some(Keyword::Is) => {
                    self.advance();
                    let op = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        BinaryOp::IsNot
                    } else {
                        BinaryOp::Is
                    };
                    let rhs = self.parse_expression(r_bp)?;
                    Expr::infix(op, lhs, rhs)
                }
                Some(Keyword::Isnull) => {
                    self.advance();
                    Expr::infix(BinaryOp::Is, lhs, Expr::Literal(Literal::Null))
                }
                Some(Keyword::Notnull) => {
                    self.advance();
                    Expr::infix(BinaryOp::IsNot, lhs, Expr::Literal(Literal::Null))
                }
                Some(Keyword::In) => {
                    self.advance();
                    self.expect(&TokenKind::LeftParen)?;
                    let items = if self.check(&TokenKind::RightParen) {
                        Vec::new()
                    } else {
                        self.parse_expression_list()?
                    };
                    self.expect(&TokenKind::RightParen)?;
                    let op = if negated { BinaryOp::NotIn } else { BinaryOp::In };
                    Expr::infix(op, lhs, Expr::List(items))
                }
                Some(Keyword::Between) => {
                    self.advance();
                    let low = self.parse_expression(r_bp)?;
                    self.expect_keyword(Keyword::And)?;
                    let high = self.parse_expression(r_bp)?;
                    Expr::Between {
                        expr: Box::new(lhs),
                        low: Box::new(low),
                        high: Box::new(high),
                        negated,
                    }
                }
                _ => {
                    let Some(op) = token_to_binary_op(&self.current.kind) else {
                        break;
                    };
                    let op = match (op, negated) {
                        (BinaryOp::Like, true) => BinaryOp::NotLike,
                        (BinaryOp::Glob, true) => BinaryOp::NotGlob,
                        (op, _) => op,
                    };
                    self.advance();
                    let rhs = self.parse_expression(r_bp)?;
                    if matches!(op, BinaryOp::Like | BinaryOp::NotLike)
                        && self.check_keyword(Keyword::Escape)
                    {
                        self.advance();
                        let escape = self.parse_expression(r_bp)?;
                        Expr::LikeEscape {
                            expr: Box::new(lhs),
                            pattern: Box::new(rhs),
                            escape: Box::new(escape),
                            negated,
                        }
                    } else {
                        Expr::infix(op, lhs, rhs)
                    }
                }
            };
        }

        Ok(lhs)
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = token_to_unary_op(&self.current.kind) {
            self.advance();
            // A minus directly in front of a number is part of the literal.
            if op == UnaryOp::Neg
                && matches!(self.current.kind, TokenKind::Integer(_) | TokenKind::Float(_))
            {
                let literal = self.negated_number();
                self.advance();
                return Ok(Expr::Literal(literal));
            }
            let operand = self.parse_expression(prefix_binding_power(op))?;
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
            });
        }

        self.parse_primary()
    }

    /// Returns the negation of the current numeric token without consuming it.
    ///
    /// `-9223372036854775808` folds to `i64::MIN` although its digits overflow on their own.
    #[allow(clippy::cast_precision_loss)]
    fn negated_number(&self) -> Literal {
        match self.current.kind {
            TokenKind::Integer(i) => i.checked_neg().map_or_else(
                // Only a hex literal with the sign bit set gets here.
                || Literal::Float(-(i as f64)),
                Literal::Integer,
            ),
            TokenKind::Float(_) if self.current.span.slice(self.input) == I64_MIN_DIGITS => {
                Literal::Integer(i64::MIN)
            }
            TokenKind::Float(x) => Literal::Float(-x),
            _ => Literal::Null,
        }
    }

    /// Consumes a literal token, if the current token is one.
    fn parse_literal(&mut self) -> Option<Literal> {
        let literal = match &self.current.kind {
            TokenKind::Integer(i) => Literal::Integer(*i),
            TokenKind::Float(x) => Literal::Float(*x),
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Blob(b) => Literal::Blob(b.clone()),
            TokenKind::Keyword(Keyword::Null) => Literal::Null,
            TokenKind::Keyword(Keyword::True) => Literal::Boolean(true),
            TokenKind::Keyword(Keyword::False) => Literal::Boolean(false),
            TokenKind::Keyword(Keyword::CurrentTime) => Literal::CurrentTime,
            TokenKind::Keyword(Keyword::CurrentDate) => Literal::CurrentDate,
            TokenKind::Keyword(Keyword::CurrentTimestamp) => Literal::CurrentTimestamp,
            _ => return None,
        };
        self.advance();
        Some(literal)
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if let Some(literal) = self.parse_literal() {
            return Ok(Expr::Literal(literal));
        }

        if self.check_keyword(Keyword::Case) {
            return self.parse_case_expression();
        }
        if self.check_keyword(Keyword::Cast) && self.peek_kind() == TokenKind::LeftParen {
            return self.parse_cast_expression();
        }

        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let mut items = self.parse_expression_list()?;
            self.expect(&TokenKind::RightParen)?;
            return Ok(if items.len() == 1 {
                items.remove(0)
            } else {
                Expr::List(items)
            });
        }

        if self.is_name() {
            let name = self.expect_name()?;
            if self.check(&TokenKind::LeftParen) {
                self.advance();
                let args = if self.check(&TokenKind::RightParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect(&TokenKind::RightParen)?;
                return Ok(Expr::call(name, args));
            }
            return Ok(Expr::Identifier(name));
        }

        Err(self.error_here("expression"))
    }

    /// Parses `CAST(expr AS type)`.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_type_name()?;
        if data_type.as_str().is_empty() {
            return Err(self.error_here("type name"));
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// Parses `CASE [operand] WHEN ... THEN ... [ELSE ...] END`.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;
        let operand = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_clauses = vec![];
        while self.check_keyword(Keyword::When) {
            self.advance();
            let when = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then = self.parse_expression(0)?;
            when_clauses.push((when, then));
        }
        if when_clauses.is_empty() {
            return Err(self.error_here("WHEN"));
        }

        let else_clause = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };
        self.expect_keyword(Keyword::End)?;

        Ok(Expr::Case {
            operand,
            when_clauses,
            else_clause,
        })
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![];
        loop {
            exprs.push(self.parse_expression(0)?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(exprs)
    }

    fn parse_name_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![];
        loop {
            names.push(self.expect_name()?);
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(names)
    }

    // --- Helper methods ---

    /// Fails unless all input has been consumed (a trailing `;` is allowed).
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` pointing at the first unconsumed token.
    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if self.current.is_eof() {
            Ok(())
        } else {
            Err(self.error_here("end of input"))
        }
    }

    fn advance(&mut self) {
        self.previous = core::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Returns the kind of the token after the current one.
    fn peek_kind(&self) -> TokenKind {
        self.lexer.clone().next_token().kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Builds the error for an unexpected current token.
    fn error_here(&self, expected: &str) -> ParseError {
        match &self.current.kind {
            TokenKind::Eof => ParseError::unexpected_eof(expected, self.current.span),
            TokenKind::Error(message) => ParseError::new(message.clone(), self.current.span),
            found => ParseError::unexpected(expected, found.clone(), self.current.span),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(&format!("{kind:?}")))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(keyword.as_str()))
        }
    }

    /// Returns true if the current token can be read as a name.
    fn is_name(&self) -> bool {
        match &self.current.kind {
            TokenKind::Identifier(_) | TokenKind::String(_) => true,
            TokenKind::Keyword(kw) => !kw.is_reserved(),
            _ => false,
        }
    }

    /// Expects a name: an identifier, a non-reserved keyword, or a string literal.
    fn expect_name(&mut self) -> Result<String, ParseError> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::String(name) => name.clone(),
            TokenKind::Keyword(kw) if !kw.is_reserved() => {
                self.current.span.slice(self.input).to_string()
            }
            _ => return Err(self.error_here("identifier")),
        };
        self.advance();
        Ok(name)
    }
}
