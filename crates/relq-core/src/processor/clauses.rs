//! Clause handlers: `from`, `where`, `or` between clauses, ordering,
//! grouping and pagination.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::context::Phase;
use super::Processor;
use crate::ast::{Node, Sexp, Tag};
use crate::error::{CompileError, Result};
use crate::parser;
use crate::query::{insert_bind, split_table_reference, Query};

static LIMIT_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" LIMIT (\d+)").expect("Invalid limit value regex"));

impl Processor<'_> {
    pub(super) fn process_query(&mut self, node: &Node) -> Result<String> {
        for child in &node.children {
            self.process(child)?;
        }

        if self.query.order.is_none() {
            if let Some(order) = self.default("order") {
                self.process_default_order(&order)?;
            }
        }
        Ok(String::new())
    }

    /// Parses the default order through a dummy relation so that it is
    /// rendered like an explicit `order by`.
    fn process_default_order(&mut self, order: &str) -> Result<()> {
        let mut tree = parser::parse(&format!("foo order by {order}"))?;
        let Some(Sexp::Node(mut order)) = tree.children.pop() else {
            return Ok(());
        };
        if order.tag != Tag::Order || order.children.is_empty() {
            return Ok(());
        }
        order.children[0] = Node::new(Tag::Void).into();
        self.process_node(&order)?;
        Ok(())
    }

    /// `query from sub_query`: the sub-query is closer to the caller's
    /// record and is resolved first.
    pub(super) fn process_from(&mut self, node: &Node) -> Result<String> {
        let query = Self::child(node, 0)?;
        let sub_query = Self::child(node, 1)?;
        self.query.distinct = true;
        self.with(|context| context.first = false, |p| p.process(sub_query))?;
        self.with(|context| context.last = false, |p| p.process(query))?;
        Ok(String::new())
    }

    pub(super) fn process_filter(&mut self, node: &Node) -> Result<String> {
        self.process(Self::child(node, 0)?)?;
        self.context.phase = Phase::Filter;
        let filter = self.process(Self::child(node, 1)?)?;
        self.add_filter(filter);
        Ok(String::new())
    }

    pub(super) fn process_clause_par(&mut self, node: &Node) -> Result<String> {
        self.process(Self::child(node, 0)?)
    }

    /// Compiles each branch of `(a) or (b) or ...` on its own copy of the
    /// query, then merges the copies.
    pub(super) fn process_clause_or(&mut self, node: &Node) -> Result<String> {
        let mut branches = Vec::new();
        collect_or_branches(node, &mut branches);

        let base = self.query.clone();
        let mut queries = Vec::with_capacity(branches.len());
        for branch in branches {
            self.query = base.clone();
            self.restoring_domain(|p| p.with(|_| (), |p| p.process(branch)))?;
            queries.push(std::mem::replace(&mut self.query, base.clone()));
        }
        if let Some(merged) = self.merge_branches(queries)? {
            self.query = merged;
        }
        Ok(String::new())
    }

    /// Unions the tables of every branch and ORs their filters.
    ///
    /// A branch lacking a table used elsewhere is handed to the domain's
    /// `resolve_missing_table`, which either patches it or refuses.
    fn merge_branches(&self, queries: Vec<Query>) -> Result<Option<Query>> {
        let mut tables: Vec<String> = Vec::new();
        for query in &queries {
            for table in &query.tables {
                if !tables.contains(table) {
                    tables.push(table.clone());
                }
            }
        }

        let branch_count = queries.len();
        let mut filters = Vec::with_capacity(branch_count);
        let mut merged: Option<Query> = None;
        for mut branch in queries {
            for table in &tables {
                if branch.tables.contains(table) {
                    continue;
                }
                let (name, alias) = split_table_reference(table);
                warn!(table = name, alias, "OR branch lacks a table, asking the domain to patch it");
                self.domain.resolve_missing_table(&mut branch, alias, name)?;
            }
            filters.push(if branch.filters.is_empty() {
                String::from("1 = 1")
            } else {
                branch.joined_filters()
            });
            match merged.as_mut() {
                Some(target) => target.absorb_aliases(branch),
                None => merged = Some(branch),
            }
        }

        let Some(mut merged) = merged else {
            return Ok(None);
        };
        merged.main_table.clone_from(&self.query.main_table);
        merged.main_class.clone_from(&self.query.main_class);
        merged.tables = tables;
        merged.filters = vec![format!("(({}))", filters.join(") OR ("))];
        merged.distinct = true;
        debug!(branches = branch_count, tables = ?merged.tables, "merged OR branches");
        Ok(Some(merged))
    }

    pub(super) fn process_order(&mut self, node: &Node) -> Result<String> {
        let fields = self.clause_list(node, Phase::Order)?;
        self.query.order = Some(format!(" ORDER BY {fields}"));
        Ok(String::new())
    }

    pub(super) fn process_group(&mut self, node: &Node) -> Result<String> {
        let fields = self.clause_list(node, Phase::Group)?;
        self.query.group = Some(format!(" GROUP BY {fields}"));
        Ok(String::new())
    }

    pub(super) fn process_having(&mut self, node: &Node) -> Result<String> {
        let condition = self.clause_list(node, Phase::Having)?;
        self.query.having = Some(format!(" HAVING {condition}"));
        Ok(String::new())
    }

    /// Processes the wrapped query, then renders the remaining children.
    fn clause_list(&mut self, node: &Node, phase: Phase) -> Result<String> {
        let (query, items) = node
            .children
            .split_first()
            .ok_or_else(|| CompileError::UnsupportedOperator(node.tag.name().to_string()))?;
        self.process(query)?;
        self.context.phase = phase;
        let items = items
            .iter()
            .map(|item| self.process(item))
            .collect::<Result<Vec<_>>>()?;
        Ok(items.join(", "))
    }

    /// `limit n` or `limit offset, n`.
    pub(super) fn process_limit(&mut self, node: &Node) -> Result<String> {
        self.process(Self::child(node, 0)?)?;
        self.context.phase = Phase::Limit;
        match &node.children[1..] {
            [count] => {
                self.query.limit = Some(format!(" LIMIT {}", self.process(count)?));
            }
            [offset, count] => {
                self.query.limit = Some(format!(" LIMIT {}", self.process(count)?));
                self.query.offset = Some(format!(" OFFSET {}", self.process(offset)?));
            }
            _ => return Err(CompileError::UnsupportedOperator(node.tag.name().to_string())),
        }
        Ok(String::new())
    }

    pub(super) fn process_offset(&mut self, node: &Node) -> Result<String> {
        self.process(Self::child(node, 0)?)?;
        if self.query.limit.is_none() {
            return Err(CompileError::Pagination(String::from(
                "Invalid offset (used without limit).",
            )));
        }
        self.context.phase = Phase::Limit;
        let offset = self.process(Self::child(node, 1)?)?;
        self.query.offset = Some(format!(" OFFSET {offset}"));
        Ok(String::new())
    }

    /// `paginate page`: the offset is computed at execution time from the
    /// page parameter and the literal limit.
    pub(super) fn process_paginate(&mut self, node: &Node) -> Result<String> {
        self.process(Self::child(node, 0)?)?;
        let page_size = self
            .query
            .limit
            .as_deref()
            .and_then(|limit| LIMIT_VALUE.captures(limit))
            .and_then(|caps| caps[1].parse::<u64>().ok())
            .ok_or_else(|| {
                CompileError::Pagination(String::from(
                    "Invalid paginate clause (used without limit).",
                ))
            })?
            .max(1);
        self.context.phase = Phase::Paginate;
        let key = self.process(Self::child(node, 1)?)?;
        let offset = insert_bind(&format!("(max({key},1)-1)*{page_size}"));
        self.query.offset = Some(format!(" OFFSET {offset}"));
        self.query.page_size = Some(page_size);
        self.query.pagination_key = Some(key);
        Ok(String::new())
    }

    pub(super) fn process_asc(&mut self, node: &Node) -> Result<String> {
        Ok(format!("{} ASC", self.process(Self::child(node, 0)?)?))
    }

    pub(super) fn process_desc(&mut self, node: &Node) -> Result<String> {
        Ok(format!("{} DESC", self.process(Self::child(node, 0)?)?))
    }

    pub(super) fn process_void(&mut self, _node: &Node) -> Result<String> {
        Ok(String::new())
    }
}

/// Flattens left-nested `clause_or` chains into their branches, in order.
fn collect_or_branches<'n>(node: &'n Node, branches: &mut Vec<&'n Sexp>) {
    for child in &node.children {
        match child {
            Sexp::Node(inner) if inner.tag == Tag::ClauseOr => {
                collect_or_branches(inner, branches);
            }
            other => branches.push(other),
        }
    }
}
