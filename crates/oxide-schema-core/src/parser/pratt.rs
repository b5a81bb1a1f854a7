//! Binding powers for Pratt expression parsing.
//!
//! Levels mirror SQLite's operator precedence, loosest first: `OR`, `AND`, `NOT`, equality
//! (`=`, `IS`, `IN`, `LIKE`, `GLOB`, `BETWEEN`), relational, bitwise, additive,
//! multiplicative, `||`, `COLLATE`, then unary operators.

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

/// Left binding power of the equality group, including its `NOT`-prefixed forms.
pub const EQUALITY_BP: (u8, u8) = (8, 9);

/// Left binding power of postfix `COLLATE`.
pub const COLLATE_BP: u8 = 20;

/// Returns the binding power an operand of a prefix operator is parsed with.
#[must_use]
pub const fn prefix_binding_power(op: UnaryOp) -> u8 {
    match op {
        UnaryOp::Not => 6,
        UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitNot => 22,
    }
}

/// Returns the infix binding power for a token as `(left_bp, right_bp)`.
///
/// All operators are left associative, so `left_bp < right_bp`. Returns `None` if the token
/// is not an infix operator on its own (`NOT IN` and friends need a second token).
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some((2, 3)),
        TokenKind::Keyword(Keyword::And) => Some((4, 5)),
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Keyword(
            Keyword::Is
            | Keyword::In
            | Keyword::Like
            | Keyword::Glob
            | Keyword::Between
            | Keyword::Isnull
            | Keyword::Notnull,
        ) => Some(EQUALITY_BP),
        TokenKind::Lt | TokenKind::LtEq | TokenKind::Gt | TokenKind::GtEq => Some((10, 11)),
        TokenKind::BitAnd | TokenKind::BitOr | TokenKind::LeftShift | TokenKind::RightShift => {
            Some((12, 13))
        }
        TokenKind::Plus | TokenKind::Minus => Some((14, 15)),
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((16, 17)),
        TokenKind::Concat => Some((18, 19)),
        _ => None,
    }
}

/// Converts a token to the binary operator it spells on its own.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Percent => Some(BinaryOp::Mod),
        TokenKind::Eq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Keyword(Keyword::Like) => Some(BinaryOp::Like),
        TokenKind::Keyword(Keyword::Glob) => Some(BinaryOp::Glob),
        TokenKind::Concat => Some(BinaryOp::Concat),
        TokenKind::BitAnd => Some(BinaryOp::BitAnd),
        TokenKind::BitOr => Some(BinaryOp::BitOr),
        TokenKind::LeftShift => Some(BinaryOp::LeftShift),
        TokenKind::RightShift => Some(BinaryOp::RightShift),
        _ => None,
    }
}

/// Converts a token to a prefix operator.
#[must_use]
pub const fn token_to_unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
        TokenKind::BitNot => Some(UnaryOp::BitNot),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left(kind: &TokenKind) -> u8 {
        infix_binding_power(kind).map_or(0, |(l, _)| l)
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(left(&TokenKind::Star) > left(&TokenKind::Plus));
        assert!(left(&TokenKind::Concat) > left(&TokenKind::Star));
        assert!(left(&TokenKind::Lt) > left(&TokenKind::Eq));
        assert!(left(&TokenKind::Eq) > left(&TokenKind::Keyword(Keyword::And)));
        assert!(
            left(&TokenKind::Keyword(Keyword::And)) > left(&TokenKind::Keyword(Keyword::Or))
        );
        assert!(COLLATE_BP > left(&TokenKind::Concat));
    }

    #[test]
    fn test_not_binds_between_and_and_equality() {
        let not = prefix_binding_power(UnaryOp::Not);
        assert!(not > left(&TokenKind::Keyword(Keyword::And)));
        assert!(not < left(&TokenKind::Eq));
    }

    #[test]
    fn test_left_associativity() {
        for kind in [TokenKind::Plus, TokenKind::Eq, TokenKind::Concat] {
            let (l, r) = infix_binding_power(&kind).unwrap();
            assert!(l < r);
        }
    }

    #[test]
    fn test_unary_ops() {
        assert_eq!(token_to_unary_op(&TokenKind::Minus), Some(UnaryOp::Neg));
        assert_eq!(token_to_unary_op(&TokenKind::Star), None);
        assert_eq!(token_to_binary_op(&TokenKind::Keyword(Keyword::In)), None);
    }
}
