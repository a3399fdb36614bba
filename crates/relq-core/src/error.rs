//! Error types for the relation compiler.

use crate::parser::SyntaxError;

/// Errors that can occur while compiling relation source into SQL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The source text is malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// No resolver hook recognized the relation.
    #[error("Unknown relation '{0}'.")]
    UnknownRelation(String),

    /// The field is neither a domain field nor a selected alias.
    #[error("Unknown field '{0}'.")]
    UnknownField(String),

    /// The domain does not know the scope.
    #[error("Invalid scope '{0}'.")]
    InvalidScope(String),

    /// A tree node has no handler and does not fit the binary fallback.
    #[error("Unsupported operator '{0}'.")]
    UnsupportedOperator(String),

    /// The domain refused to translate a method call.
    #[error("SQL function '{0}' not allowed.")]
    FunctionNotAllowed(String),

    /// `offset` or `paginate` without a literal `limit`.
    #[error("{0}")]
    Pagination(String),

    /// An OR branch lacks a table another branch uses.
    #[error("Cannot merge OR branches: table '{table}' is missing in one branch.")]
    Merge {
        /// The aliased table that is missing.
        table: String,
    },

    /// Malformed custom-query definitions.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A class-changing relation named a domain the catalog does not hold.
    #[error("Unknown domain '{0}'.")]
    UnknownDomain(String),

    /// The expression translator rejected an interpolated string.
    #[error("Invalid expression '{expression}': {message}")]
    Expression {
        /// The rejected expression source.
        expression: String,
        /// The translator's reason.
        message: String,
    },

    /// `sql()` found a bind expression without a value.
    #[error("No value bound for '{0}'.")]
    UnboundValue(String),

    /// A domain hook failed with its own reason.
    #[error("{0}")]
    Resolver(String),

    /// Top-level wrap of a resolver failure.
    #[error("Failed to compile '{input}': {message}")]
    Failed {
        /// The relation source being compiled.
        input: String,
        /// The message reported by the domain.
        message: String,
    },
}

impl From<serde_json::Error> for CompileError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for compile operations.
pub type Result<T> = std::result::Result<T, CompileError>;
