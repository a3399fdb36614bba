//! Custom-query definitions.
//!
//! A custom query is a pre-baked override of a relation: when a source names
//! it (alone, with no `from` chain), its fragments replace the query fields
//! directly. Definitions are grouped so that different callers can see
//! different sets, and keyed by the domain they belong to.
//!
//! They are usually loaded from a document shaped like:
//!
//! ```json
//! {
//!   "groups": ["test.host"],
//!   "objects": {
//!     "abc": {
//!       "select": ["a", "34 AS number", "c"],
//!       "tables": ["test"],
//!       "join_tables": {"test": ["LEFT JOIN other ON other.test_id = test.id"]},
//!       "where": ["1", "2", "3"],
//!       "order": "a DESC"
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CompileError, Result};

/// Replacement fragments for one relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomQuery {
    /// Selected expressions, possibly `expr AS key`.
    #[serde(default)]
    pub select: Option<Vec<String>>,
    /// Table references, possibly `name AS alias`.
    #[serde(default)]
    pub tables: Option<Vec<String>>,
    /// Join clauses keyed by the table they attach to.
    #[serde(default)]
    pub join_tables: Option<BTreeMap<String, Vec<String>>>,
    /// WHERE fragments.
    #[serde(default, rename = "where")]
    pub filters: Option<Vec<String>>,
    /// ORDER BY body, without the keyword.
    #[serde(default)]
    pub order: Option<String>,
    /// GROUP BY body, without the keyword.
    #[serde(default)]
    pub group: Option<String>,
    /// HAVING body, without the keyword.
    #[serde(default)]
    pub having: Option<String>,
    /// Declared types of selected keys (`integer`, `date`, ...).
    #[serde(default)]
    pub types: Option<BTreeMap<String, String>>,
    /// Class of the returned records.
    #[serde(default)]
    pub main_class: Option<String>,
    /// Table holding the returned records.
    #[serde(default)]
    pub main_table: Option<String>,
}

/// All custom-query definitions: group, then domain, then relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomQueries {
    groups: BTreeMap<String, BTreeMap<String, BTreeMap<String, CustomQuery>>>,
}

impl CustomQueries {
    /// Creates an empty set of definitions.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Returns true if no definition was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Adds (or replaces) one definition.
    pub fn insert(
        &mut self,
        group: impl Into<String>,
        domain: impl Into<String>,
        relation: impl Into<String>,
        definition: CustomQuery,
    ) {
        self.groups
            .entry(group.into())
            .or_default()
            .entry(domain.into())
            .or_default()
            .insert(relation.into(), definition);
    }

    /// Looks up a definition.
    #[must_use]
    pub fn find(&self, group: &str, domain: &str, relation: &str) -> Option<&CustomQuery> {
        self.groups.get(group)?.get(domain)?.get(relation)
    }

    /// Loads definitions from a JSON document.
    ///
    /// The document must name its group(s) with exactly one of `"group"`
    /// (a string) or `"groups"` (a list of strings). Every other key is a
    /// domain name, which `known_domain` must accept.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Configuration` on malformed JSON, missing or
    /// invalid groups, unknown domains or invalid definitions.
    pub fn load_json(&mut self, document: &str, known_domain: impl Fn(&str) -> bool) -> Result<()> {
        let Value::Object(mut root) = serde_json::from_str::<Value>(document)? else {
            return Err(configuration("custom queries must be a mapping"));
        };

        let groups = match (root.remove("group"), root.remove("groups")) {
            (Some(Value::String(group)), None) => vec![group],
            (None, Some(Value::Array(list))) if !list.is_empty() => list
                .into_iter()
                .map(|item| match item {
                    Value::String(group) => Ok(group),
                    other => Err(configuration(&format!("invalid group {other}"))),
                })
                .collect::<Result<Vec<_>>>()?,
            (Some(_), Some(_)) => {
                return Err(configuration("use either 'group' or 'groups', not both"));
            }
            (None, None) => return Err(configuration("missing 'group' or 'groups' key")),
            _ => return Err(configuration("invalid 'group' or 'groups' value")),
        };

        for (domain, relations) in root {
            if !known_domain(&domain) {
                return Err(configuration(&format!(
                    "unknown domain '{domain}' in custom queries"
                )));
            }
            let relations: BTreeMap<String, CustomQuery> = serde_json::from_value(relations)
                .map_err(|e| configuration(&format!("invalid definitions for '{domain}': {e}")))?;
            for group in &groups {
                for (relation, definition) in &relations {
                    self.insert(group.as_str(), domain.as_str(), relation.as_str(), definition.clone());
                }
            }
        }
        Ok(())
    }
}

fn configuration(message: &str) -> CompileError {
    CompileError::Configuration(message.to_string())
}
