//! The relation-resolver contract.
//!
//! A domain describes one table of the host application (its main table and
//! class) and the vocabulary of relations that can be reached from it. The
//! processor asks the active domain to resolve every relation, scope, field
//! and function it meets; a domain may hand the rest of the walk over to
//! another domain (see [`Processor::change_domain`]).
//!
//! Every hook has a default that declines, so a domain only implements what
//! it actually knows about.

use crate::ast::Sexp;
use crate::error::{CompileError, Result};
use crate::processor::Processor;
use crate::query::Query;

/// Outcome of a resolver hook that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T = ()> {
    /// The hook recognized the name and did its work.
    Matched(T),
    /// The hook does not know the name; the next one is tried.
    NotApplicable,
}

impl<T> Resolution<T> {
    /// Returns true for `Matched`.
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

/// How a scope ties the current occurrence of the main table to the previous
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFields {
    /// `current.first = previous.second`
    Compare(String, String),
    /// A known scope that needs no filter (`in site`).
    Unscoped,
}

impl ScopeFields {
    /// Shorthand for `Compare`.
    #[must_use]
    pub fn compare(current: impl Into<String>, previous: impl Into<String>) -> Self {
        Self::Compare(current.into(), previous.into())
    }
}

/// A relation vocabulary bound to one main table.
///
/// Hooks receive the live processor so that they can add tables and filters,
/// resolve fields and apply scopes through it.
#[allow(unused_variables)]
pub trait Domain: Send + Sync {
    /// Name used to look the domain up in the catalog and in custom queries.
    fn name(&self) -> &str;

    /// Table holding the records of this domain.
    fn main_table(&self) -> &str;

    /// Class of the records of this domain.
    fn main_class(&self) -> &str;

    /// Domain level defaults (`scope`, `order`).
    fn default(&self, key: &str) -> Option<String> {
        None
    }

    /// Resolves a scope name.
    ///
    /// `NotApplicable` makes the processor fail with an invalid scope error.
    fn scope_fields(&self, cx: &Processor<'_>, scope: &str) -> Result<Resolution<ScopeFields>> {
        Ok(Resolution::NotApplicable)
    }

    /// Renders a field of the current table. The processor falls back to
    /// selected aliases when this declines.
    fn process_field(&self, cx: &mut Processor<'_>, name: &str) -> Result<Resolution<String>> {
        Ok(Resolution::NotApplicable)
    }

    /// Relations that move the rest of the walk to another domain.
    fn class_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        Ok(Resolution::NotApplicable)
    }

    /// Relations that need another table and a join predicate.
    fn join_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        Ok(Resolution::NotApplicable)
    }

    /// Relations that reinterpret the current table (`parent`, `project`).
    fn context_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        Ok(Resolution::NotApplicable)
    }

    /// Relations that filter the main table and are scoped afterwards.
    fn filter_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        Ok(Resolution::NotApplicable)
    }

    /// Returns false for scopes that should not be applied before a join.
    fn need_join_scope(&self, scope: &str) -> bool {
        true
    }

    /// Translates `argument.method` into an SQL function call.
    fn process_function(
        &self,
        cx: &mut Processor<'_>,
        argument: &str,
        method: &str,
    ) -> Result<Resolution<String>> {
        Ok(Resolution::NotApplicable)
    }

    /// Renders `left = right` when the domain has a special form for it.
    fn process_equal(
        &self,
        cx: &mut Processor<'_>,
        left: &Sexp,
        right: &Sexp,
    ) -> Result<Resolution<String>> {
        Ok(Resolution::NotApplicable)
    }

    /// Patches an OR branch that lacks a table used by another branch.
    ///
    /// # Errors
    ///
    /// The default refuses the merge.
    fn resolve_missing_table(&self, query: &mut Query, alias: &str, table: &str) -> Result<()> {
        Err(CompileError::Merge {
            table: alias.to_string(),
        })
    }

    /// Called once before the tree is walked.
    fn before_process(&self, cx: &mut Processor<'_>) -> Result<()> {
        Ok(())
    }

    /// Called once after the tree is walked.
    fn after_process(&self, cx: &mut Processor<'_>) -> Result<()> {
        Ok(())
    }
}
