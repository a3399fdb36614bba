//! SQL rendering and bind extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::{restore_literals, Query};
use crate::connection::Connection;
use crate::error::{CompileError, Result};
use crate::value::{Bindings, SqlValue};

/// `[[expression]]`, where the expression may itself end with `]`.
static BIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[(.*?\]*)\]\]").expect("Invalid bind marker regex"));
static GROUP_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GROUP\s+BY\s+(.+)").expect("Invalid group by regex"));
static ORDER_DIRECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(ASC|DESC)\z").expect("Invalid order direction regex"));

/// The kind of statement to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementKind {
    /// `SELECT ... FROM ...` returning records.
    #[default]
    Find,
    /// `SELECT COUNT(...) FROM ...`.
    Count,
}

impl Query {
    /// Renders the statement with `?` placeholders and its ordered binds.
    ///
    /// Binds are listed in the order their markers appear in the rendered
    /// text.
    #[must_use]
    pub fn build_statement(&self, kind: StatementKind) -> (String, Vec<String>) {
        let statement = self.statement(kind);
        let placeholder = self.dialect.parameter_placeholder();
        let mut binds = Vec::new();
        let sql = BIND.replace_all(&statement, |caps: &regex::Captures<'_>| {
            binds.push(restore_literals(&caps[1]));
            placeholder
        });
        (restore_literals(&sql), binds)
    }

    /// Serializes the query as `"sql"` or `["sql", bind, ...]`.
    ///
    /// # Examples
    ///
    /// ```text
    /// ["SELECT objects.* FROM objects WHERE objects.project_id = ?", project_id]
    /// "SELECT objects.* FROM objects"
    /// ```
    #[must_use]
    pub fn to_s(&self, kind: StatementKind) -> String {
        let (statement, binds) = self.build_statement(kind);
        let statement = quote_literal(&statement);
        if binds.is_empty() {
            statement
        } else {
            let mut parts = vec![statement];
            parts.extend(binds);
            format!("[{}]", parts.join(", "))
        }
    }

    /// Renders executable SQL, quoting bound values through the dialect.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnboundValue` if a bind expression has no value.
    pub fn sql(&self, bindings: &impl Bindings, kind: StatementKind) -> Result<String> {
        let dialect = self.dialect.as_ref();
        self.substitute(bindings, kind, |value| dialect.quote_value(value))
    }

    /// Renders executable SQL, quoting bound values through `connection`.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::UnboundValue` if a bind expression has no value.
    pub fn sql_with(
        &self,
        connection: &dyn Connection,
        bindings: &impl Bindings,
        kind: StatementKind,
    ) -> Result<String> {
        self.substitute(bindings, kind, |value| connection.quote(value))
    }

    /// Replaces each marker with its quoted value in a single pass, so that
    /// `?` inside literals is never touched. Bound values are pushed as is.
    fn substitute(
        &self,
        bindings: &impl Bindings,
        kind: StatementKind,
        quote: impl Fn(&SqlValue) -> String,
    ) -> Result<String> {
        let statement = self.statement(kind);
        let mut sql = String::with_capacity(statement.len());
        let mut last = 0;
        for caps in BIND.captures_iter(&statement) {
            let (Some(marker), Some(expression)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = bindings
                .value(expression.as_str())
                .ok_or_else(|| CompileError::UnboundValue(expression.as_str().to_string()))?;
            sql.push_str(&restore_literals(&statement[last..marker.start()]));
            sql.push_str(&quote_bound(&value, &quote));
            last = marker.end();
        }
        sql.push_str(&restore_literals(&statement[last..]));
        Ok(sql)
    }

    fn statement(&self, kind: StatementKind) -> String {
        match kind {
            StatementKind::Find => self.find_statement(),
            StatementKind::Count => self.count_statement(),
        }
    }

    /// Table references decorated with their joins, sorted.
    fn table_list(&self) -> String {
        let mut list: Vec<String> = self
            .tables
            .iter()
            .map(|table| {
                let name = table.split_whitespace().last().unwrap_or(table.as_str());
                match self.join_tables.get(name) {
                    Some(joins) if !joins.is_empty() => format!("{table} {}", joins.join(" ")),
                    _ => table.clone(),
                }
            })
            .collect();
        list.sort();
        list.join(",")
    }

    fn where_clause(&self) -> String {
        if self.filters.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.joined_filters())
        }
    }

    fn find_statement(&self) -> String {
        let mut group = self.group.clone().unwrap_or_default();
        let mut distinct = String::new();
        if self.group.is_none() && self.distinct {
            let mut key = if self.tables.len() > 1 {
                format!("{}.id", self.main_table)
            } else {
                String::from("id")
            };
            if self.dialect.supports_distinct_on() {
                let order_keys = self
                    .order
                    .as_deref()
                    .and_then(|order| order.split_once("ORDER BY "))
                    .map(|(_, keys)| keys);
                for order_key in order_keys.into_iter().flat_map(|keys| keys.split(',')) {
                    key.push(',');
                    key.push_str(&ORDER_DIRECTION.replace(order_key.trim(), ""));
                }
                distinct = format!(" DISTINCT ON ({key})");
            } else {
                group = format!(" GROUP BY {key}");
            }
        }

        let select = self
            .select
            .as_ref()
            .map_or_else(|| format!("{}.*", self.main_table), |fields| fields.join(","));

        format!(
            "SELECT{distinct} {select} FROM {}{}{group}{}{}{}{}",
            self.table_list(),
            self.where_clause(),
            self.having.as_deref().unwrap_or_default(),
            self.order.as_deref().unwrap_or_default(),
            self.limit.as_deref().unwrap_or_default(),
            self.offset.as_deref().unwrap_or_default(),
        )
    }

    fn count_statement(&self) -> String {
        let grouped = self
            .group
            .as_deref()
            .and_then(|group| GROUP_BY.captures(group))
            .map(|caps| {
                caps[1]
                    .split(',')
                    .map(|field| format!("COALESCE({},0)", field.trim()))
                    .collect::<Vec<_>>()
                    .join(",")
            });
        let count_on = match grouped {
            // COALESCE so that groups on NULL are counted too
            Some(fields) => format!("COUNT(DISTINCT {fields})"),
            None if self.distinct => format!("COUNT(DISTINCT {}.id)", self.current_table()),
            None => String::from("COUNT(*)"),
        };
        format!(
            "SELECT {count_on} FROM {}{}",
            self.table_list(),
            self.where_clause()
        )
    }
}

/// Quotes a bound value; lists expand element-wise, empty lists are NULL.
fn quote_bound(value: &SqlValue, quote: &impl Fn(&SqlValue) -> String) -> String {
    match value {
        SqlValue::List(items) if items.is_empty() => quote(&SqlValue::Null),
        SqlValue::List(items) => items
            .iter()
            .map(quote)
            .collect::<Vec<_>>()
            .join(","),
        other => quote(other),
    }
}

fn quote_literal(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}
