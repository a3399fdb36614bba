//! Parser error types.

use crate::lexer::Span;

/// A syntax error in relation source text.
///
/// No partial tree is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    /// The error message.
    pub message: String,
    /// The location of the offending token.
    pub span: Span,
    /// The unconsumed input, starting at the offending token.
    pub remainder: String,
}

impl SyntaxError {
    /// Creates a "Syntax error near '...'" error for the token at `span`.
    #[must_use]
    pub fn near(input: &str, span: Span) -> Self {
        let remainder = span.remainder(input).to_string();
        Self {
            message: format!("Syntax error near '{remainder}'."),
            span,
            remainder,
        }
    }

    /// Creates an error for a character the lexer could not scan.
    #[must_use]
    pub fn lexical(input: &str, span: Span, reason: &str) -> Self {
        let remainder = span.remainder(input).to_string();
        Self {
            message: format!("{reason} near '{remainder}'."),
            span,
            remainder,
        }
    }

    /// Creates an error for a parenthesis that is never closed.
    #[must_use]
    pub fn unmatched(input: &str, span: Span) -> Self {
        let remainder = span.remainder(input).to_string();
        Self {
            message: format!("Syntax error: unmatched parenthesis near '{remainder}'."),
            span,
            remainder,
        }
    }
}
