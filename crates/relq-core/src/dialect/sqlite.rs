//! SQLite dialect.

use super::Dialect;
use crate::value::SqlValue;

/// SQLite dialect. Booleans are stored as integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_value(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            SqlValue::List(items) if !items.is_empty() => items
                .iter()
                .map(|item| self.quote_value(item))
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_sql_inline(),
        }
    }
}
