//! Precedence tiers for the reduction stack.
//!
//! Clause keywords and expression operators share one table so that the same
//! stack machine builds both. Higher binds tighter.

use crate::ast::{Operator, Tag};
use crate::lexer::{Keyword, TokenKind};

/// Closing parenthesis: pops everything above the matching marker.
pub const PAR_CLOSE: i8 = 0;

/// Returns the precedence tier of a node tag.
#[must_use]
pub const fn precedence(tag: Tag) -> i8 {
    match tag {
        Tag::Function => 50,
        Tag::Interval => 40,
        Tag::Op(op) => operator_precedence(op),
        Tag::Relation | Tag::Filter => 13,
        Tag::Scope => 12,
        Tag::From => 11,
        Tag::Asc | Tag::Desc => 10,
        Tag::ClauseAnd => 4,
        Tag::ClauseOr => 3,
        Tag::Limit | Tag::Offset | Tag::Paginate | Tag::Order | Tag::Group | Tag::Having => 2,
        Tag::Query => 1,
        Tag::Par | Tag::ClausePar => -1,
        // Leaves never sit on the stack.
        Tag::Field
        | Tag::Param
        | Tag::String
        | Tag::DString
        | Tag::Integer
        | Tag::Real
        | Tag::Null
        | Tag::Method
        | Tag::Void => 60,
    }
}

/// Returns the precedence tier of an expression operator.
#[must_use]
pub const fn operator_precedence(op: Operator) -> i8 {
    match op {
        Operator::Bang => 38,
        Operator::ChangeSign | Operator::InvertBits => 37,
        Operator::BitXor => 36,
        Operator::Times | Operator::Division | Operator::IntegerDivision | Operator::Modulo => 35,
        Operator::Minus | Operator::Plus => 34,
        Operator::LeftShift | Operator::RightShift => 33,
        Operator::BitAnd => 32,
        Operator::BitOr => 31,
        Operator::Equal
        | Operator::NullSafeEqual
        | Operator::GreaterOrEqual
        | Operator::Greater
        | Operator::LessOrEqual
        | Operator::Less
        | Operator::NotEqual
        | Operator::Is
        | Operator::Like
        | Operator::Regexp
        | Operator::In => 30,
        Operator::Between => 29,
        Operator::Not => 28,
        Operator::And => 27,
        Operator::Xor => 26,
        Operator::Or => 25,
        Operator::Assign => 24,
    }
}

/// Converts a token to a binary operator.
///
/// `in`, `not`, `between` and `is` are contextual and handled by the parser.
#[must_use]
pub const fn token_to_binary_op(kind: &TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Plus => Some(Operator::Plus),
        TokenKind::Minus => Some(Operator::Minus),
        TokenKind::Star => Some(Operator::Times),
        TokenKind::Slash => Some(Operator::Division),
        TokenKind::Percent | TokenKind::Keyword(Keyword::Mod) => Some(Operator::Modulo),
        TokenKind::Keyword(Keyword::Div) => Some(Operator::IntegerDivision),
        TokenKind::Caret => Some(Operator::BitXor),
        TokenKind::LeftShift => Some(Operator::LeftShift),
        TokenKind::RightShift => Some(Operator::RightShift),
        TokenKind::BitAnd => Some(Operator::BitAnd),
        TokenKind::BitOr => Some(Operator::BitOr),
        TokenKind::Eq | TokenKind::Keyword(Keyword::Eq) => Some(Operator::Equal),
        TokenKind::NullSafeEq => Some(Operator::NullSafeEqual),
        TokenKind::NotEq | TokenKind::Keyword(Keyword::Ne) => Some(Operator::NotEqual),
        TokenKind::Lt | TokenKind::Keyword(Keyword::Lt) => Some(Operator::Less),
        TokenKind::LtEq | TokenKind::Keyword(Keyword::Le) => Some(Operator::LessOrEqual),
        TokenKind::Gt | TokenKind::Keyword(Keyword::Gt) => Some(Operator::Greater),
        TokenKind::GtEq | TokenKind::Keyword(Keyword::Ge) => Some(Operator::GreaterOrEqual),
        TokenKind::Keyword(Keyword::Like) => Some(Operator::Like),
        TokenKind::Keyword(Keyword::Regexp) => Some(Operator::Regexp),
        TokenKind::Keyword(Keyword::And) | TokenKind::DoubleAmpersand => Some(Operator::And),
        TokenKind::Keyword(Keyword::Or) | TokenKind::DoublePipe => Some(Operator::Or),
        TokenKind::Keyword(Keyword::Xor) => Some(Operator::Xor),
        TokenKind::Assign => Some(Operator::Assign),
        _ => None,
    }
}

/// Converts a token to a prefix operator.
#[must_use]
pub const fn token_to_prefix_op(kind: &TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Keyword(Keyword::Not) => Some(Operator::Not),
        TokenKind::Bang => Some(Operator::Bang),
        TokenKind::Minus => Some(Operator::ChangeSign),
        TokenKind::BitNot => Some(Operator::InvertBits),
        _ => None,
    }
}
