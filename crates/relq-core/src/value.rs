//! Bind values and binding lookups.
//!
//! A compiled query carries bind *expressions* (`id`, `params[:page]`, ...).
//! Turning them into executable SQL needs values for those expressions,
//! supplied through [`Bindings`].

use std::collections::{BTreeMap, HashMap};

/// A value substituted for a bind placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// A sequence, expanded element-wise for `IN (...)` lists.
    List(Vec<SqlValue>),
}

impl SqlValue {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Lists render as comma separated quoted elements; an empty list is
    /// `NULL` so that `IN (NULL)` stays valid SQL.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => {
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::List(items) if items.is_empty() => String::from("NULL"),
            Self::List(items) => items
                .iter()
                .map(Self::to_sql_inline)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: ToSqlValue> ToSqlValue for Vec<T> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::List(self.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

/// Resolves bind expressions to values at execution time.
pub trait Bindings {
    /// Returns the value of a bind expression, or `None` if it is unknown.
    fn value(&self, expression: &str) -> Option<SqlValue>;
}

impl<S: std::hash::BuildHasher> Bindings for HashMap<String, SqlValue, S> {
    fn value(&self, expression: &str) -> Option<SqlValue> {
        self.get(expression).cloned()
    }
}

impl Bindings for BTreeMap<String, SqlValue> {
    fn value(&self, expression: &str) -> Option<SqlValue> {
        self.get(expression).cloned()
    }
}

/// Bindings backed by a closure, see [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

/// Creates [`Bindings`] from a closure.
pub const fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Option<SqlValue>,
{
    FromFn(f)
}

impl<F> Bindings for FromFn<F>
where
    F: Fn(&str) -> Option<SqlValue>,
{
    fn value(&self, expression: &str) -> Option<SqlValue> {
        (self.0)(expression)
    }
}
