//! PostgreSQL dialect.

use super::Dialect;

/// PostgreSQL dialect. Distinct queries use `DISTINCT ON`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }
}
