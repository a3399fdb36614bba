//! Token types for the relation language lexer.

use super::Span;

/// Reserved words of the relation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // Clauses
    Where,
    From,
    In,
    Limit,
    Offset,
    Paginate,
    Order,
    Group,
    Having,
    By,

    // Ordering
    Asc,
    Desc,

    // Logical operators
    And,
    Or,
    Xor,
    Not,

    // Predicates
    Like,
    Regexp,
    Is,
    Between,
    Null,

    // Word operators
    Div,
    Mod,
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "where" => Some(Self::Where),
            "from" => Some(Self::From),
            "in" => Some(Self::In),
            "limit" => Some(Self::Limit),
            "offset" => Some(Self::Offset),
            "paginate" => Some(Self::Paginate),
            "order" => Some(Self::Order),
            "group" => Some(Self::Group),
            "having" => Some(Self::Having),
            "by" => Some(Self::By),
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "xor" => Some(Self::Xor),
            "not" => Some(Self::Not),
            "like" => Some(Self::Like),
            "regexp" => Some(Self::Regexp),
            "is" => Some(Self::Is),
            "between" => Some(Self::Between),
            "null" => Some(Self::Null),
            "div" => Some(Self::Div),
            "mod" => Some(Self::Mod),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "ge" => Some(Self::Ge),
            "gt" => Some(Self::Gt),
            _ => None,
        }
    }

    /// Returns the keyword as written in source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Where => "where",
            Self::From => "from",
            Self::In => "in",
            Self::Limit => "limit",
            Self::Offset => "offset",
            Self::Paginate => "paginate",
            Self::Order => "order",
            Self::Group => "group",
            Self::Having => "having",
            Self::By => "by",
            Self::Asc => "asc",
            Self::Desc => "desc",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Not => "not",
            Self::Like => "like",
            Self::Regexp => "regexp",
            Self::Is => "is",
            Self::Between => "between",
            Self::Null => "null",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Gt => "gt",
        }
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Integer literal, kept as written (e.g., 42)
    Integer(String),
    /// Real literal, kept as written (e.g., 3.14)
    Real(String),
    /// Quoted string with escapes resolved
    String(String),
    /// Double-quoted string containing `#{...}` interpolations
    DString(String),

    // Identifiers and keywords
    /// Relation, scope, field or parameter name
    Identifier(String),
    /// Reserved word
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
    /// ^
    Caret,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <=>
    NullSafeEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~
    BitNot,
    /// &&
    DoubleAmpersand,
    /// ||
    DoublePipe,
    /// !
    Bang,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// :=
    Assign,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// .
    Dot,

    // Special
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its span in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
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

    /// Returns true if this is the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_case_insensitive() {
        assert_eq!(Keyword::from_str("WHERE"), Some(Keyword::Where));
        assert_eq!(Keyword::from_str("Paginate"), Some(Keyword::Paginate));
        assert_eq!(Keyword::from_str("letters"), None);
    }

    #[test]
    fn test_keyword_as_str_round_trip() {
        for keyword in [Keyword::Order, Keyword::Between, Keyword::Ge, Keyword::Null] {
            assert_eq!(Keyword::from_str(keyword.as_str()), Some(keyword));
        }
    }

    #[test]
    fn test_token_predicates() {
        let token = Token::new(TokenKind::Keyword(Keyword::In), Span::new(0, 2));
        assert!(token.is_keyword(Keyword::In));
        assert!(!token.is_eof());
        assert!(Token::new(TokenKind::Eof, Span::new(2, 2)).is_eof());
    }
}
