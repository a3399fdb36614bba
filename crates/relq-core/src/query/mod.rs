//! The query accumulator.
//!
//! A `Query` collects the tables, filters and clauses produced while the
//! processor walks a relation tree, then renders them as SQL with bind
//! placeholders ([`Query::to_s`]) or as executable SQL ([`Query::sql`]).
//!
//! Bind expressions are embedded in fragments as `[[expression]]` markers and
//! only extracted when the final statement is rendered, so their order always
//! follows the rendered text.

mod render;

pub use render::StatementKind;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::config::CustomQuery;
use crate::dialect::Dialect;

static TABLE_AS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(.+)\s+AS\s+(.+)\z").expect("Invalid table alias regex"));
static SELECT_AS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A(.*)\s+AS\s+(.+)\z").expect("Invalid select alias regex"));
static SELECT_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A(\w+\.|)([^*]+)\z").expect("Invalid select column regex"));

/// Starts an escape inside a protected literal.
const ESCAPE: char = '\u{1}';

/// Wraps a bind expression in a placeholder marker.
#[must_use]
pub fn insert_bind(expression: &str) -> String {
    format!("[[{expression}]]")
}

/// Hides the brackets of a quoted literal so that `'[[x]]'` in the source
/// never reads as a bind marker. Undone by [`restore_literals`].
#[must_use]
pub(crate) fn protect_literal(text: &str) -> String {
    let mut protected = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ESCAPE => {
                protected.push(ESCAPE);
                protected.push('0');
            }
            '[' => {
                protected.push(ESCAPE);
                protected.push('1');
            }
            other => protected.push(other),
        }
    }
    protected
}

/// Brings back the text hidden by [`protect_literal`].
#[must_use]
pub(crate) fn restore_literals(text: &str) -> String {
    let mut restored = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            restored.push(c);
            continue;
        }
        match chars.peek() {
            Some('0') => {
                chars.next();
                restored.push(ESCAPE);
            }
            Some('1') => {
                chars.next();
                restored.push('[');
            }
            _ => restored.push(c),
        }
    }
    restored
}

/// Compile-time state of one (sub-)query.
#[derive(Clone)]
pub struct Query {
    pub(crate) dialect: Arc<dyn Dialect>,
    pub(crate) main_table: String,
    pub(crate) main_class: String,
    /// Table references, `name` or `name AS alias`, in insertion order.
    pub(crate) tables: Vec<String>,
    /// Every alias handed out per table, in order of use.
    pub(crate) table_alias: BTreeMap<String, Vec<String>>,
    /// Join clauses keyed by the alias they attach to.
    pub(crate) join_tables: BTreeMap<String, Vec<String>>,
    /// Emitted joins keyed by join name and current main alias.
    pub(crate) needed_join_tables: BTreeMap<(String, String), String>,
    /// current main alias -> index table -> key -> alias
    pub(crate) key_value_tables: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
    pub(crate) filters: Vec<String>,
    pub(crate) select: Option<Vec<String>>,
    pub(crate) order: Option<String>,
    pub(crate) group: Option<String>,
    pub(crate) having: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) offset: Option<String>,
    pub(crate) distinct: bool,
    pub(crate) attributes_alias: BTreeMap<String, String>,
    pub(crate) types: BTreeMap<String, String>,
    pub(crate) pagination_key: Option<String>,
    pub(crate) page_size: Option<u64>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("dialect", &self.dialect.name())
            .field("main_table", &self.main_table)
            .field("main_class", &self.main_class)
            .field("tables", &self.tables)
            .field("filters", &self.filters)
            .field("select", &self.select)
            .field("distinct", &self.distinct)
            .finish_non_exhaustive()
    }
}

impl Query {
    /// Creates an empty query over `main_table`.
    #[must_use]
    pub fn new(
        dialect: Arc<dyn Dialect>,
        main_table: impl Into<String>,
        main_class: impl Into<String>,
    ) -> Self {
        Self {
            dialect,
            main_table: main_table.into(),
            main_class: main_class.into(),
            tables: Vec::new(),
            table_alias: BTreeMap::new(),
            join_tables: BTreeMap::new(),
            needed_join_tables: BTreeMap::new(),
            key_value_tables: BTreeMap::new(),
            filters: Vec::new(),
            select: None,
            order: None,
            group: None,
            having: None,
            limit: None,
            offset: None,
            distinct: false,
            attributes_alias: BTreeMap::new(),
            types: BTreeMap::new(),
            pagination_key: None,
            page_size: None,
        }
    }

    /// Returns the dialect used for quoting and rendering.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Returns the table holding the returned records.
    #[must_use]
    pub fn main_table(&self) -> &str {
        &self.main_table
    }

    /// Returns the class of the returned records.
    #[must_use]
    pub fn main_class(&self) -> &str {
        &self.main_class
    }

    /// Returns the table references in insertion order.
    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Returns the WHERE fragments in insertion order.
    #[must_use]
    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// Returns the explicit select list, if any.
    #[must_use]
    pub fn select(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    /// Returns the rendered ORDER BY clause, if any.
    #[must_use]
    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    /// Returns the rendered GROUP BY clause, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns the rendered HAVING clause, if any.
    #[must_use]
    pub fn having(&self) -> Option<&str> {
        self.having.as_deref()
    }

    /// Returns the rendered LIMIT clause, if any.
    #[must_use]
    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    /// Returns the rendered OFFSET clause, if any.
    #[must_use]
    pub fn offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }

    /// Returns true if rows must be deduplicated.
    #[must_use]
    pub const fn distinct(&self) -> bool {
        self.distinct
    }

    /// Returns the selected aliases and their source expressions.
    #[must_use]
    pub const fn attributes_alias(&self) -> &BTreeMap<String, String> {
        &self.attributes_alias
    }

    /// Returns the join clauses keyed by the alias they attach to.
    #[must_use]
    pub const fn join_tables(&self) -> &BTreeMap<String, Vec<String>> {
        &self.join_tables
    }

    /// Returns the pagination parameter name, if `paginate` was used.
    #[must_use]
    pub fn pagination_key(&self) -> Option<&str> {
        self.pagination_key.as_deref()
    }

    /// Returns the page size, if `paginate` was used.
    #[must_use]
    pub const fn page_size(&self) -> Option<u64> {
        self.page_size
    }

    /// Returns all explicitly selected keys.
    #[must_use]
    pub fn select_keys(&self) -> Vec<&str> {
        self.attributes_alias.keys().map(String::as_str).collect()
    }

    /// Returns the declared type of a selected key, `string` by default.
    #[must_use]
    pub fn type_of(&self, key: &str) -> &str {
        self.types.get(key).map_or("string", String::as_str)
    }

    /// Returns the declared type of every selected key.
    #[must_use]
    pub fn types(&self) -> BTreeMap<String, String> {
        let mut types = self.types.clone();
        for key in self.attributes_alias.keys() {
            types
                .entry(key.clone())
                .or_insert_with(|| String::from("string"));
        }
        types
    }

    /// Adds a WHERE fragment.
    pub fn add_filter(&mut self, filter: impl Into<String>) {
        self.filters.push(filter.into());
    }

    /// Returns the WHERE body: fragments in reverse insertion order.
    #[must_use]
    pub fn filter(&self) -> String {
        restore_literals(&self.joined_filters())
    }

    /// The WHERE body with quoted literals still protected.
    pub(crate) fn joined_filters(&self) -> String {
        self.filters
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Adds a usage of `table_name` known as `use_name`.
    ///
    /// With `avoid_alias`, the first usage keeps the bare table name so that
    /// the outermost occurrence can be referenced literally.
    pub fn add_table(&mut self, use_name: &str, table_name: &str, avoid_alias: bool) {
        let alias = self.get_alias(use_name, table_name, avoid_alias);
        if alias == table_name {
            self.tables.push(table_name.to_string());
        } else {
            self.tables.push(format!("{table_name} AS {alias}"));
        }
    }

    /// Returns an alias of `table_name`.
    ///
    /// `index` 0 is the latest alias, -1 the one before. Positive indexes
    /// count from the first alias (1 is the first).
    #[must_use]
    pub fn table(&self, table_name: &str, index: i32) -> Option<&str> {
        let aliases = self.table_alias.get(table_name)?;
        let offset = i64::from(index) - 1;
        let position = if offset >= 0 {
            usize::try_from(offset).ok()?
        } else {
            aliases
                .len()
                .checked_sub(usize::try_from(-offset).ok()?)?
        };
        aliases.get(position).map(String::as_str)
    }

    /// Returns the latest alias of the main table, or its bare name.
    #[must_use]
    pub fn current_table(&self) -> &str {
        self.table(&self.main_table, 0).unwrap_or(&self.main_table)
    }

    /// Adds an index table for a key/value field, once per current table.
    ///
    /// `join` receives the new alias and returns the filter tying it to the
    /// current table. It is only called the first time.
    pub fn add_key_value_table(
        &mut self,
        use_name: &str,
        index_table: &str,
        key: &str,
        join: impl FnOnce(&str) -> String,
    ) -> String {
        let current = self.current_table().to_string();
        let existing = self
            .key_value_tables
            .get(&current)
            .and_then(|tables| tables.get(use_name))
            .and_then(|keys| keys.get(key));
        if let Some(alias) = existing {
            return alias.clone();
        }

        self.add_table(use_name, index_table, false);
        let alias = self
            .table(use_name, 0)
            .map_or_else(|| use_name.to_string(), str::to_string);
        self.key_value_tables
            .entry(current)
            .or_default()
            .entry(use_name.to_string())
            .or_default()
            .insert(key.to_string(), alias.clone());
        let filter = join(&alias);
        self.add_filter(filter);
        alias
    }

    /// Adds a join of `table2` onto `table1`, once per join name and
    /// current table. `TABLE1` and `TABLE2` in `clause` are replaced by the
    /// actual aliases. Returns the alias of `table2`.
    pub fn needs_join_table(
        &mut self,
        table1: &str,
        join_type: &str,
        table2: &str,
        clause: &str,
        join_name: Option<&str>,
    ) -> String {
        let name = join_name.map_or_else(
            || format!("{table1}={join_type}={table2}"),
            str::to_string,
        );
        let key = (name, self.current_table().to_string());
        if let Some(alias) = self.needed_join_tables.get(&key) {
            return alias.clone();
        }

        let second = self.join_alias(table2);
        let first = self
            .table(table1, 0)
            .map_or_else(|| table1.to_string(), str::to_string);
        let reference = if second == table2 {
            second.clone()
        } else {
            format!("{table2} AS {second}")
        };
        let on = clause.replace("TABLE1", &first).replace("TABLE2", &second);
        self.join_tables
            .entry(first)
            .or_default()
            .push(format!("{join_type} JOIN {reference} ON {on}"));
        self.needed_join_tables.insert(key, second.clone());
        second
    }

    /// Selects `field` as `name`. A `name:type` suffix declares the type.
    pub fn add_select(&mut self, field: &str, name: &str) {
        let name = match name.rsplit_once(':') {
            Some((key, kind)) => {
                self.types.insert(key.to_string(), kind.to_string());
                key
            }
            None => name,
        };
        let quoted = self.dialect.quote_identifier(name);
        let main_table = &self.main_table;
        self.select
            .get_or_insert_with(|| vec![format!("{main_table}.*")])
            .push(format!("{field} AS {quoted}"));
        self.attributes_alias
            .insert(name.to_string(), field.to_string());
    }

    /// Replaces query fields with a custom-query definition.
    pub(crate) fn apply_custom_query(&mut self, definition: &CustomQuery) {
        if let Some(select) = &definition.select {
            self.select = Some(select.clone());
        }
        if let Some(tables) = &definition.tables {
            self.tables.clone_from(tables);
        }
        if let Some(join_tables) = &definition.join_tables {
            self.join_tables.clone_from(join_tables);
        }
        if let Some(filters) = &definition.filters {
            self.filters.clone_from(filters);
        }
        if let Some(order) = &definition.order {
            self.order = Some(format!(" ORDER BY {order}"));
        }
        if let Some(group) = &definition.group {
            self.group = Some(format!(" GROUP BY {group}"));
        }
        if let Some(having) = &definition.having {
            self.having = Some(format!(" HAVING {having}"));
        }
        if let Some(types) = &definition.types {
            self.types.clone_from(types);
        }
        if let Some(main_class) = &definition.main_class {
            self.main_class.clone_from(main_class);
        }
        if let Some(main_table) = &definition.main_table {
            self.main_table.clone_from(main_table);
        }
        self.rebuild_tables();
        self.rebuild_attributes_hash();
    }

    /// Rebuilds the alias cache from `tables`.
    pub(crate) fn rebuild_tables(&mut self) {
        self.table_alias.clear();
        for table in &self.tables {
            let (base, use_name) = match TABLE_AS.captures(table) {
                Some(caps) => (caps[1].to_string(), caps[2].to_string()),
                None => (table.clone(), table.clone()),
            };
            self.table_alias.entry(base).or_default().push(use_name);
        }
    }

    /// Rebuilds the selected aliases from `select`.
    pub(crate) fn rebuild_attributes_hash(&mut self) {
        self.attributes_alias.clear();
        for field in self.select.iter().flatten() {
            if let Some(caps) = SELECT_AS.captures(field) {
                let key = unquote(&caps[2]).to_string();
                self.attributes_alias.insert(key, caps[1].to_string());
            } else if let Some(caps) = SELECT_COLUMN.captures(field) {
                self.attributes_alias
                    .insert(caps[2].to_string(), field.clone());
            }
        }
    }

    /// Unions the alias bookkeeping of another OR branch into this one.
    pub(crate) fn absorb_aliases(&mut self, other: Self) {
        for (table, aliases) in other.table_alias {
            let known = self.table_alias.entry(table).or_default();
            for alias in aliases {
                if !known.contains(&alias) {
                    known.push(alias);
                }
            }
        }
        for (alias, joins) in other.join_tables {
            let known = self.join_tables.entry(alias).or_default();
            for join in joins {
                if !known.contains(&join) {
                    known.push(join);
                }
            }
        }
        for (key, alias) in other.needed_join_tables {
            self.needed_join_tables.entry(key).or_insert(alias);
        }
        for (key, field) in other.attributes_alias {
            self.attributes_alias.entry(key).or_insert(field);
        }
    }

    /// Names a joined table: bare on its first use, then `ta1`, `ta2`, ...
    /// skipping aliases already taken by earlier joins or FROM entries.
    fn join_alias(&mut self, table: &str) -> String {
        let taken = self.table_alias.get(table).cloned().unwrap_or_default();
        let alias = if taken.is_empty() && !self.tables.iter().any(|t| t == table) {
            table.to_string()
        } else {
            let prefix: String = table.chars().take(2).collect();
            (taken.len().max(1)..)
                .map(|n| format!("{prefix}{n}"))
                .find(|alias| !taken.contains(alias))
                .unwrap_or_else(|| format!("{prefix}{}", taken.len()))
        };
        self.table_alias
            .entry(table.to_string())
            .or_default()
            .push(alias.clone());
        alias
    }

    /// Makes sure each table usage gets a unique name (`ob1`, `ob2`, ...).
    fn get_alias(&mut self, use_name: &str, table_name: &str, avoid_alias: bool) -> String {
        let used = self.table_alias.get(use_name).map_or(0, Vec::len);
        let prefix: String = use_name.chars().take(2).collect();
        let alias = if avoid_alias && !self.tables.iter().any(|t| t == table_name) {
            use_name.to_string()
        } else if self.tables.iter().any(|t| t == use_name) {
            format!("{prefix}{used}")
        } else {
            format!("{prefix}{}", used + 1)
        };
        self.table_alias
            .entry(use_name.to_string())
            .or_default()
            .push(alias.clone());
        alias
    }
}

/// Splits a table reference into its table name and alias.
pub(crate) fn split_table_reference(reference: &str) -> (&str, &str) {
    reference
        .split_once(" AS ")
        .unwrap_or((reference, reference))
}

/// Strips matching quotes around a selected key (`'key'`, `"key"`, `` `key` ``).
fn unquote(key: &str) -> &str {
    for quote in ['\'', '"', '`'] {
        if let Some(inner) = key
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    key
}
