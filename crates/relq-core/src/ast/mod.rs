//! Parsed relation trees.
//!
//! The parser produces a tagged S-expression: every node is a tag plus an
//! ordered list of children, each either a nested node or a raw string.

mod sexp;

pub use sexp::{Node, Operator, Sexp, Tag};
