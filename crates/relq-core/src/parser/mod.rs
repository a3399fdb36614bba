//! Relation language parser
//!
//! A hand-written operator-precedence stack machine. Clause keywords and
//! expression operators share one precedence table, so the same reduction
//! loop builds `from` chains, filters and arithmetic alike.

mod error;
mod parser;
mod precedence;

pub use error::SyntaxError;
pub use parser::Parser;
pub use precedence::{operator_precedence, precedence};

use crate::ast::Node;

/// Parses relation source text into a `[:query, ...]` tree.
///
/// # Errors
///
/// Returns a `SyntaxError` if the input is not valid relation source.
pub fn parse(input: &str) -> Result<Node, SyntaxError> {
    Parser::new(input).parse()
}
