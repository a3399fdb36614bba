//! Relation language lexer.
//!
//! A hand-written lexer producing the token stream consumed by the
//! stack-machine parser.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
