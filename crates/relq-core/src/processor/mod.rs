//! The tree-walking compiler.
//!
//! A [`Processor`] walks the tree produced by the parser and fills a
//! [`Query`]. Each node tag maps to a handler through a static table; binary
//! operators without a handler are rendered as `left OP right`.
//!
//! Relations, scopes, fields and functions are resolved by the active
//! [`Domain`]. A domain may switch the walk to another domain (a relation
//! crossing into another table); OR branches restore the domain they started
//! with so that sibling branches are interpreted in the right vocabulary.

mod clauses;
mod context;
mod expr;
mod relation;

pub use context::{Context, Phase, ScopeType};

use std::sync::Arc;

use tracing::trace;

use crate::ast::{Node, Operator, Sexp, Tag};
use crate::catalog::{Catalog, CompileOptions};
use crate::domain::Domain;
use crate::error::{CompileError, Result};
use crate::query::Query;

type Handler<'c> = fn(&mut Processor<'c>, &Node) -> Result<String>;

/// Compiler state for one source string.
pub struct Processor<'c> {
    catalog: &'c Catalog,
    options: &'c CompileOptions,
    domain: Arc<dyn Domain>,
    context: Context,
    query: Query,
}

impl std::fmt::Debug for Processor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("domain", &self.domain.name())
            .field("context", &self.context)
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl<'c> Processor<'c> {
    pub(crate) fn new(
        catalog: &'c Catalog,
        domain: Arc<dyn Domain>,
        options: &'c CompileOptions,
    ) -> Self {
        let main_class = options
            .main_class
            .clone()
            .unwrap_or_else(|| domain.main_class().to_string());
        let query = Query::new(Arc::clone(catalog.dialect()), domain.main_table(), main_class);
        Self {
            catalog,
            options,
            domain,
            context: Context::default(),
            query,
        }
    }

    /// Walks `tree` and returns the compiled query.
    pub(crate) fn run(mut self, tree: &Node) -> Result<Query> {
        let domain = Arc::clone(&self.domain);
        domain.before_process(&mut self)?;

        if tree.children.is_empty() {
            let main_table = self.main_table().to_string();
            let implicit = Node::with_children(
                Tag::Query,
                vec![Node::leaf(Tag::Relation, main_table).into()],
            );
            self.process_node(&implicit)?;
        } else {
            self.process_node(tree)?;
        }

        if self.query.limit.is_none() {
            if let Some(limit) = self.options.limit {
                self.query.limit = Some(format!(" LIMIT {limit}"));
            }
        }

        let domain = Arc::clone(&self.domain);
        domain.after_process(&mut self)?;
        Ok(self.query)
    }

    /// Renders one child: atoms pass through, nodes are dispatched.
    ///
    /// # Errors
    ///
    /// Propagates any resolution error raised while rendering the subtree.
    pub fn process(&mut self, sexp: &Sexp) -> Result<String> {
        match sexp {
            Sexp::Atom(text) => Ok(text.clone()),
            Sexp::Node(node) => self.process_node(node),
        }
    }

    fn process_node(&mut self, node: &Node) -> Result<String> {
        trace!(tag = node.tag.name(), domain = self.domain.name(), "processing node");
        if let Some(handler) = Self::handler(node.tag) {
            return handler(self, node);
        }
        match (node.tag, node.children.as_slice()) {
            (Tag::Op(op), [left, right]) => self.binary(op, left, right),
            _ => Err(CompileError::UnsupportedOperator(node.tag.name().to_string())),
        }
    }

    fn handler(tag: Tag) -> Option<Handler<'c>> {
        let handler: Handler<'c> = match tag {
            Tag::Query => Self::process_query,
            Tag::Relation => Self::process_relation,
            Tag::Scope => Self::process_scope,
            Tag::From => Self::process_from,
            Tag::Filter => Self::process_filter,
            Tag::ClauseOr => Self::process_clause_or,
            Tag::ClausePar => Self::process_clause_par,
            Tag::Par => Self::process_par,
            Tag::Order => Self::process_order,
            Tag::Group => Self::process_group,
            Tag::Having => Self::process_having,
            Tag::Limit => Self::process_limit,
            Tag::Offset => Self::process_offset,
            Tag::Paginate => Self::process_paginate,
            Tag::Asc => Self::process_asc,
            Tag::Desc => Self::process_desc,
            Tag::Field => Self::process_field,
            Tag::Param | Tag::Integer | Tag::Real | Tag::Method => Self::process_literal,
            Tag::String => Self::process_string,
            Tag::DString => Self::process_dstring,
            Tag::Null => Self::process_null,
            Tag::Function => Self::process_function,
            Tag::Interval => Self::process_interval,
            Tag::Void => Self::process_void,
            Tag::Op(Operator::Not | Operator::Bang) => Self::process_not,
            Tag::Op(Operator::Or) => Self::process_or,
            Tag::Op(Operator::Equal) => Self::process_equal,
            Tag::Op(Operator::Between) => Self::process_between,
            Tag::Op(Operator::ChangeSign) => Self::process_change_sign,
            Tag::ClauseAnd | Tag::Op(_) => return None,
        };
        Some(handler)
    }

    /// Runs `body` with a patched context, restoring the previous context
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns the error of `body`.
    pub fn with<T>(
        &mut self,
        patch: impl FnOnce(&mut Context),
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.context.clone();
        patch(&mut self.context);
        let result = body(self);
        self.context = saved;
        result
    }

    /// Returns the active domain.
    #[must_use]
    pub fn domain(&self) -> &dyn Domain {
        self.domain.as_ref()
    }

    /// Returns the catalog the processor resolves domains from.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        self.catalog
    }

    /// Returns the options of this compile.
    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        self.options
    }

    /// Returns the current walk context.
    #[must_use]
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the current walk context for modification.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Returns the query being built.
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the query being built for modification.
    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// True while processing the outermost relation of a `from` chain.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.context.first
    }

    /// True while processing the innermost relation of a `from` chain.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.context.last
    }

    /// Returns the scope requested with `in <scope>`, if any.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.context.scope.as_deref()
    }

    /// Returns the main table of the active domain.
    #[must_use]
    pub fn main_table(&self) -> &str {
        self.query.main_table()
    }

    /// Adds a WHERE fragment.
    pub fn add_filter(&mut self, filter: impl Into<String>) {
        self.query.add_filter(filter);
    }

    /// Returns a default, compile options first, then the domain.
    #[must_use]
    pub fn default(&self, key: &str) -> Option<String> {
        self.options
            .defaults
            .get(key)
            .cloned()
            .or_else(|| self.domain.default(key))
    }

    /// Returns the scope applied to relations that did not name one.
    ///
    /// Overrides from the compile options only apply to the innermost
    /// relation; earlier relations of a chain keep the domain default.
    #[must_use]
    pub fn default_scope(&self) -> Option<String> {
        if self.is_last() {
            self.default("scope")
        } else {
            self.domain.default("scope")
        }
    }

    /// Sets the scope to the default one when none was requested.
    pub fn use_default_scope(&mut self) {
        if self.context.scope.is_none() {
            self.context.scope = self.default_scope();
        }
    }

    fn child<'n>(node: &'n Node, index: usize) -> Result<&'n Sexp> {
        node.children
            .get(index)
            .ok_or_else(|| CompileError::UnsupportedOperator(node.tag.name().to_string()))
    }

    fn atom(node: &Node, index: usize) -> Result<&str> {
        Self::child(node, index)?
            .as_atom()
            .ok_or_else(|| CompileError::UnsupportedOperator(node.tag.name().to_string()))
    }
}
