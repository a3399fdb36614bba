//! SQL Dialect support.
//!
//! Compiled queries are mostly dialect neutral. Dialects decide how values and
//! identifiers are quoted and how a distinct query is deduplicated: engines
//! with `DISTINCT ON` use it, the others get a synthesized `GROUP BY`.

mod generic;
mod postgres;
mod sqlite;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::value::SqlValue;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: std::fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns the parameter placeholder style.
    fn parameter_placeholder(&self) -> &'static str {
        "?"
    }

    /// Quotes an identifier.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Quotes a value for inline use.
    fn quote_value(&self, value: &SqlValue) -> String {
        value.to_sql_inline()
    }

    /// Returns whether `SELECT DISTINCT ON (...)` is available.
    fn supports_distinct_on(&self) -> bool {
        false
    }
}
