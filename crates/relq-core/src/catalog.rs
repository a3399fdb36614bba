//! Compile configuration.
//!
//! A [`Catalog`] is built once at startup and then shared read-only between
//! compiles. It holds the domains relations can switch between, the
//! custom-query definitions and the SQL dialect. Per compile settings live in
//! [`CompileOptions`].
//!
//! # Example
//!
//! ```ignore
//! let catalog = Catalog::new()
//!     .with_domain(ObjectsDomain)
//!     .with_domain(UsersDomain);
//! let query = catalog.compile("objects", "letters in project", &CompileOptions::new())?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::CustomQueries;
use crate::connection::{Connection, ExpressionTranslator};
use crate::dialect::{Dialect, GenericDialect};
use crate::domain::Domain;
use crate::error::{CompileError, Result};
use crate::parser;
use crate::processor::Processor;
use crate::query::Query;

/// Domains, custom queries and dialect shared by every compile.
#[derive(Clone)]
pub struct Catalog {
    domains: BTreeMap<String, Arc<dyn Domain>>,
    custom_queries: CustomQueries,
    dialect: Arc<dyn Dialect>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("domains", &self.domains.keys().collect::<Vec<_>>())
            .field("custom_queries", &self.custom_queries)
            .field("dialect", &self.dialect.name())
            .finish()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Creates an empty catalog using the generic dialect.
    #[must_use]
    pub fn new() -> Self {
        Self {
            domains: BTreeMap::new(),
            custom_queries: CustomQueries::new(),
            dialect: Arc::new(GenericDialect::new()),
        }
    }

    /// Registers a domain under its name.
    #[must_use]
    pub fn with_domain(mut self, domain: impl Domain + 'static) -> Self {
        self.domains
            .insert(domain.name().to_string(), Arc::new(domain));
        self
    }

    /// Sets the SQL dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    /// Replaces the custom-query definitions.
    #[must_use]
    pub fn with_custom_queries(mut self, custom_queries: CustomQueries) -> Self {
        self.custom_queries = custom_queries;
        self
    }

    /// Loads custom-query definitions from a JSON document. Domains must be
    /// registered first.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Configuration` for malformed documents or
    /// unknown domains.
    pub fn load_custom_queries(mut self, document: &str) -> Result<Self> {
        let domains = &self.domains;
        self.custom_queries
            .load_json(document, |name| domains.contains_key(name))?;
        Ok(self)
    }

    /// Returns a registered domain.
    #[must_use]
    pub fn domain(&self, name: &str) -> Option<Arc<dyn Domain>> {
        self.domains.get(name).cloned()
    }

    /// Returns the custom-query definitions.
    #[must_use]
    pub const fn custom_queries(&self) -> &CustomQueries {
        &self.custom_queries
    }

    /// Returns the SQL dialect.
    #[must_use]
    pub const fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// Compiles `source` starting in the domain named `domain`.
    ///
    /// # Errors
    ///
    /// Returns a `CompileError` on syntax or resolution errors. Failures
    /// reported by domain hooks are wrapped in `CompileError::Failed`.
    pub fn compile(&self, domain: &str, source: &str, options: &CompileOptions) -> Result<Query> {
        debug!(domain, source, "compiling relation");
        let start = self
            .domain(domain)
            .ok_or_else(|| CompileError::UnknownDomain(domain.to_string()))?;
        let tree = parser::parse(source)?;
        let result = Processor::new(self, start, options).run(&tree);
        match result {
            Ok(query) => {
                debug!(domain, source, main_table = query.main_table(), "compiled relation");
                Ok(query)
            }
            Err(CompileError::Resolver(message)) => Err(CompileError::Failed {
                input: source.to_string(),
                message,
            }),
            Err(err) => {
                debug!(domain, source, error = %err, "compile failed");
                Err(err)
            }
        }
    }
}

/// Settings of one compile.
#[derive(Clone, Default)]
pub struct CompileOptions {
    /// Group of custom queries visible to this compile.
    pub custom_query_group: Option<String>,
    /// Overrides of domain defaults (`scope`, `order`).
    pub defaults: BTreeMap<String, String>,
    /// LIMIT applied when the source has none.
    pub limit: Option<u64>,
    /// Translates execution-time expressions.
    pub translator: Option<Arc<dyn ExpressionTranslator>>,
    /// Class reported for the returned records.
    pub main_class: Option<String>,
    /// Quotes string literals instead of the dialect.
    pub connection: Option<Arc<dyn Connection>>,
}

impl fmt::Debug for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOptions")
            .field("custom_query_group", &self.custom_query_group)
            .field("defaults", &self.defaults)
            .field("limit", &self.limit)
            .field("translator", &self.translator.is_some())
            .field("main_class", &self.main_class)
            .field("connection", &self.connection.is_some())
            .finish()
    }
}

impl CompileOptions {
    /// Creates options with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the custom queries of `group` visible.
    #[must_use]
    pub fn custom_query_group(mut self, group: impl Into<String>) -> Self {
        self.custom_query_group = Some(group.into());
        self
    }

    /// Overrides a domain default.
    #[must_use]
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Sets the LIMIT used when the source has none.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the expression translator.
    #[must_use]
    pub fn translator(mut self, translator: impl ExpressionTranslator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Overrides the class reported for the returned records.
    #[must_use]
    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    /// Quotes string literals through `connection`.
    #[must_use]
    pub fn connection(mut self, connection: impl Connection + 'static) -> Self {
        self.connection = Some(Arc::new(connection));
        self
    }
}
