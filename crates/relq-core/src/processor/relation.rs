//! Relation resolution, scopes and table bookkeeping.
//!
//! In `letters from friends in project from foo`, relations are resolved
//! right to left: `foo`, then `friends` scoped to `project`, then `letters`
//! with its default scope. Join relations apply their scope before the new
//! occurrence of the main table is added, filter relations after, so that the
//! scope always compares the newest occurrence with the previous one.

use std::sync::Arc;

use tracing::debug;

use super::context::{Phase, ScopeType};
use super::Processor;
use crate::ast::Node;
use crate::domain::{Domain, Resolution, ScopeFields};
use crate::error::{CompileError, Result};
use crate::query::insert_bind;

impl Processor<'_> {
    pub(super) fn process_relation(&mut self, node: &Node) -> Result<String> {
        let relation = Self::atom(node, 0)?;
        if self.custom_query(relation) {
            debug!(relation, "custom query loaded");
            return Ok(String::new());
        }

        let domain = Arc::clone(&self.domain);
        let hooks: [(&str, Option<ScopeType>); 4] = [
            ("class", None),
            ("join", Some(ScopeType::Join)),
            ("context", Some(ScopeType::Context)),
            ("filter", Some(ScopeType::Filter)),
        ];
        for (hook, scope_type) in hooks {
            if scope_type.is_some() {
                self.context.scope_type = scope_type;
            }
            let resolution = match scope_type {
                None => domain.class_relation(self, relation)?,
                Some(ScopeType::Join) => domain.join_relation(self, relation)?,
                Some(ScopeType::Context) => domain.context_relation(self, relation)?,
                Some(ScopeType::Filter) => domain.filter_relation(self, relation)?,
            };
            if resolution.is_matched() {
                debug!(relation, hook, domain = domain.name(), "relation resolved");
                return Ok(String::new());
            }
        }
        Err(CompileError::UnknownRelation(relation.to_string()))
    }

    pub(super) fn process_scope(&mut self, node: &Node) -> Result<String> {
        let relation = Self::child(node, 0)?;
        let scope = Self::atom(node, 1)?.to_string();
        self.with(|context| context.scope = Some(scope), |p| p.process(relation))
    }

    /// Loads a custom query in place of the relation.
    ///
    /// Only a relation that is both first and last may name one.
    fn custom_query(&mut self, relation: &str) -> bool {
        if !(self.is_first() && self.is_last()) {
            return false;
        }
        let (catalog, options) = (self.catalog, self.options);
        let Some(group) = options.custom_query_group.as_deref() else {
            return false;
        };
        let Some(definition) = catalog
            .custom_queries()
            .find(group, self.domain.name(), relation)
        else {
            return false;
        };
        self.query.apply_custom_query(definition);
        true
    }

    /// Filters the current occurrence of the main table against the
    /// previous one.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidScope` when the domain does not know the
    /// scope, or any error raised while rendering the compared fields.
    pub fn apply_scope(&mut self, scope: &str) -> Result<()> {
        self.context.phase = Phase::Scope;
        let domain = Arc::clone(&self.domain);
        match domain.scope_fields(self, scope)? {
            Resolution::NotApplicable => Err(CompileError::InvalidScope(scope.to_string())),
            Resolution::Matched(ScopeFields::Unscoped) => Ok(()),
            Resolution::Matched(ScopeFields::Compare(current, previous)) => {
                let current = self.field_or_attr(&current)?;
                let previous_table = self.table_at(self.main_table(), -1);
                let previous = self.field_or_attr_in(&previous, previous_table.as_deref())?;
                self.add_filter(format!("{current} = {previous}"));
                Ok(())
            }
        }
    }

    /// Adds a usage of a table named after itself. See [`Self::add_table_as`].
    ///
    /// # Errors
    ///
    /// Returns any error raised while applying the scope.
    pub fn add_table(&mut self, use_name: &str) -> Result<()> {
        self.add_table_as(use_name, use_name)
    }

    /// Adds a usage of `table_name` known as `use_name`.
    ///
    /// Other tables keep their bare name when possible. For the main table
    /// the pending scope is applied before (join relations) or after (filter
    /// relations) adding it, and the first relation of a chain gets the bare
    /// table name.
    ///
    /// # Errors
    ///
    /// Returns any error raised while applying the scope.
    pub fn add_table_as(&mut self, use_name: &str, table_name: &str) -> Result<()> {
        let main_table = self.main_table().to_string();
        if use_name != main_table {
            self.query.add_table(use_name, table_name, true);
            return Ok(());
        }

        let avoid_alias = self.is_first();
        if avoid_alias {
            self.context.table_alias = Some(use_name.to_string());
        }

        match self.context.scope_type {
            Some(ScopeType::Join) => {
                self.context.scope_type = None;
                let scope = self
                    .context
                    .scope
                    .clone()
                    .filter(|scope| self.domain.need_join_scope(scope));
                if let Some(scope) = scope {
                    self.query.add_table(&main_table, &main_table, avoid_alias);
                    self.apply_scope(&scope)?;
                }
                self.query.add_table(use_name, table_name, avoid_alias);
            }
            Some(ScopeType::Filter) => {
                self.context.scope_type = None;
                self.query.add_table(use_name, table_name, avoid_alias);
                let scope = self.context.scope.clone().or_else(|| self.default_scope());
                if let Some(scope) = scope {
                    self.apply_scope(&scope)?;
                }
            }
            _ => self.query.add_table(use_name, table_name, avoid_alias),
        }
        Ok(())
    }

    /// Returns the alias fields are rendered against: the context override,
    /// else the latest alias of the main table.
    #[must_use]
    pub fn current_alias(&self) -> Option<String> {
        self.context
            .table_alias
            .clone()
            .or_else(|| self.table_at(self.main_table(), 0))
    }

    /// Returns the current alias, or the bare main table.
    #[must_use]
    pub fn table(&self) -> String {
        self.current_alias()
            .unwrap_or_else(|| self.main_table().to_string())
    }

    /// Returns an alias of `table_name`, see [`crate::query::Query::table`].
    #[must_use]
    pub fn table_at(&self, table_name: &str, index: i32) -> Option<String> {
        self.query.table(table_name, index).map(str::to_string)
    }

    /// Renders `name` as a field of the current alias, or as a bind when no
    /// occurrence of the main table exists yet.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownField` for unknown fields.
    pub fn field_or_attr(&mut self, name: &str) -> Result<String> {
        let alias = self.current_alias();
        self.field_or_attr_in(name, alias.as_deref())
    }

    /// Renders `name` as a field of `alias`, or as a bind without alias.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownField` for unknown fields and
    /// `CompileError::Expression` when the translator rejects the bind.
    pub fn field_or_attr_in(&mut self, name: &str, alias: Option<&str>) -> Result<String> {
        match alias {
            Some(alias) => {
                let alias = alias.to_string();
                self.with(
                    |context| context.table_alias = Some(alias),
                    |p| p.resolve_field(name),
                )
            }
            None => self.attr(name),
        }
    }

    /// Renders a field through the domain, falling back to selected aliases.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownField` when neither knows the name.
    pub fn resolve_field(&mut self, name: &str) -> Result<String> {
        let domain = Arc::clone(&self.domain);
        if let Resolution::Matched(field) = domain.process_field(self, name)? {
            return Ok(field);
        }
        match self.query.attributes_alias.get(name) {
            Some(field) if self.context.phase == Phase::Filter => Ok(format!("({field})")),
            Some(field) => Ok(field.clone()),
            None => Err(CompileError::UnknownField(name.to_string())),
        }
    }

    /// Wraps an execution-time expression in a bind marker, translated when
    /// a translator is configured.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Expression` when the translator rejects it.
    pub fn attr(&self, name: &str) -> Result<String> {
        match &self.options.translator {
            Some(translator) => translator
                .translate(name)
                .map(|expression| insert_bind(&expression))
                .map_err(|message| CompileError::Expression {
                    expression: name.to_string(),
                    message,
                }),
            None => Ok(insert_bind(name)),
        }
    }

    /// Hands the rest of the walk over to another domain of the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnknownDomain` when the catalog has no such
    /// domain.
    pub fn change_domain(&mut self, name: &str) -> Result<()> {
        let domain = self
            .catalog
            .domain(name)
            .ok_or_else(|| CompileError::UnknownDomain(name.to_string()))?;
        debug!(from = self.domain.name(), to = name, "changing domain");
        self.switch_domain(domain);
        Ok(())
    }

    fn switch_domain(&mut self, domain: Arc<dyn Domain>) {
        self.query.main_table = domain.main_table().to_string();
        self.query.main_class = domain.main_class().to_string();
        self.context.table_alias = None;
        self.domain = domain;
    }

    /// Runs `body` and switches back to the current domain if `body` left
    /// another one active.
    pub(super) fn restoring_domain<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = Arc::clone(&self.domain);
        let result = body(self);
        if !Arc::ptr_eq(&saved, &self.domain) {
            debug!(from = self.domain.name(), to = saved.name(), "restoring domain");
            self.domain = saved;
        }
        result
    }
}
