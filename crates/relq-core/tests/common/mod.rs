//! Shared fixtures for integration tests: a small node/user data model.

#![allow(dead_code)]

use relq_core::{
    Catalog, CompileError, CompileOptions, Domain, Processor, Query, Resolution, Result,
    ScopeFields, StatementKind,
};

const OBJECT_FIELDS: &[&str] = &[
    "id",
    "parent_id",
    "project_id",
    "section_id",
    "kpath",
    "name",
    "event_at",
    "custom_a",
];

const USER_FIELDS: &[&str] = &["id", "name", "first_name", "node_id"];

/// Nodes of a tree: children live under their parent, letters and clients
/// are kinds of nodes, links tie nodes together.
#[derive(Debug, Default)]
pub struct ObjectsDomain {
    /// Lets OR branches that lack the `links` table be merged.
    pub patch_missing_tables: bool,
}

impl ObjectsDomain {
    fn kind_filter(cx: &mut Processor<'_>, kpath: &str) -> Result<()> {
        let main_table = cx.main_table().to_string();
        cx.add_table(&main_table)?;
        let table = cx.table();
        cx.add_filter(format!("{table}.kpath LIKE '{kpath}%'"));
        Ok(())
    }

    fn link(cx: &mut Processor<'_>, other_side: &str, relation_id: u32, own_side: &str) -> Result<()> {
        let main_table = cx.main_table().to_string();
        cx.add_table(&main_table)?;
        cx.add_table("links")?;
        let links = cx.table_at("links", 0).unwrap_or_else(|| String::from("links"));
        let id = cx.field_or_attr("id")?;
        let previous = cx.table_at(&main_table, -1);
        let previous_id = cx.field_or_attr_in("id", previous.as_deref())?;
        cx.add_filter(format!(
            "{id} = {links}.{own_side} AND {links}.relation_id = {relation_id} \
             AND {links}.{other_side} = {previous_id}"
        ));
        Ok(())
    }
}

impl Domain for ObjectsDomain {
    fn name(&self) -> &str {
        "objects"
    }

    fn main_table(&self) -> &str {
        "objects"
    }

    fn main_class(&self) -> &str {
        "Node"
    }

    fn default(&self, key: &str) -> Option<String> {
        (key == "scope").then(|| String::from("self"))
    }

    fn scope_fields(&self, cx: &Processor<'_>, scope: &str) -> Result<Resolution<ScopeFields>> {
        let fields = match scope {
            "self" => ScopeFields::compare("parent_id", "id"),
            "parent" if cx.is_last() => ScopeFields::compare("parent_id", "parent_id"),
            "parent" => ScopeFields::compare("parent_id", "id"),
            "project" if cx.is_last() => ScopeFields::compare("project_id", "project_id"),
            "project" => ScopeFields::compare("project_id", "id"),
            "site" | "objects" => ScopeFields::Unscoped,
            _ => return Ok(Resolution::NotApplicable),
        };
        Ok(Resolution::Matched(fields))
    }

    fn process_field(&self, cx: &mut Processor<'_>, name: &str) -> Result<Resolution<String>> {
        if OBJECT_FIELDS.contains(&name) {
            return Ok(Resolution::Matched(format!("{}.{name}", cx.table())));
        }
        let Some(key) = name.strip_prefix("d_") else {
            return Ok(Resolution::NotApplicable);
        };
        let current = cx.table();
        let alias = cx
            .query_mut()
            .add_key_value_table("idx_strings", "idx_strings", key, |alias| {
                format!("{alias}.node_id = {current}.id AND {alias}.key = '{key}'")
            });
        Ok(Resolution::Matched(format!("{alias}.value")))
    }

    fn class_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        if relation != "users" {
            return Ok(Resolution::NotApplicable);
        }
        let main_table = cx.main_table().to_string();
        cx.add_table("users")?;
        cx.add_table(&main_table)?;
        let users = cx.table_at("users", 0).unwrap_or_else(|| String::from("users"));
        let id = cx.field_or_attr("id")?;
        cx.add_filter(format!("{users}.node_id = {id}"));
        if cx.is_last() {
            if let Some(scope) = cx.default_scope() {
                cx.apply_scope(&scope)?;
            }
        }
        cx.change_domain("users")?;
        Ok(Resolution::Matched(()))
    }

    fn join_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        match relation {
            "recipients" => Self::link(cx, "source_id", 4, "target_id")?,
            "icons" => Self::link(cx, "target_id", 5, "source_id")?,
            "tags" => {
                cx.add_table("objects")?;
                cx.query_mut().needs_join_table(
                    "objects",
                    "INNER",
                    "tags",
                    "TABLE1.id = TABLE2.node_id",
                    None,
                );
            }
            _ => return Ok(Resolution::NotApplicable),
        }
        Ok(Resolution::Matched(()))
    }

    fn context_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        let (current, previous) = match relation {
            "self" => ("id", "id"),
            "parent" => ("id", "parent_id"),
            "project" => ("id", "project_id"),
            _ => return Ok(Resolution::NotApplicable),
        };
        let main_table = cx.main_table().to_string();
        cx.add_table(&main_table)?;
        let current = cx.field_or_attr(current)?;
        let previous_table = cx.table_at(&main_table, -1);
        let previous = cx.field_or_attr_in(previous, previous_table.as_deref())?;
        cx.add_filter(format!("{current} = {previous}"));
        Ok(Resolution::Matched(()))
    }

    fn filter_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        match relation {
            "objects" | "children" => {
                cx.use_default_scope();
                cx.add_table("objects")?;
            }
            "letters" => Self::kind_filter(cx, "NNL")?,
            "clients" => Self::kind_filter(cx, "NRCC")?,
            "broken" => {
                return Err(CompileError::Resolver(String::from(
                    "missing table definition",
                )));
            }
            _ => return Ok(Resolution::NotApplicable),
        }
        Ok(Resolution::Matched(()))
    }

    fn need_join_scope(&self, scope: &str) -> bool {
        scope != "site"
    }

    fn process_function(
        &self,
        _cx: &mut Processor<'_>,
        argument: &str,
        method: &str,
    ) -> Result<Resolution<String>> {
        Ok(match method {
            "year" | "month" => Resolution::Matched(format!("{method}({argument})")),
            _ => Resolution::NotApplicable,
        })
    }

    fn resolve_missing_table(&self, query: &mut Query, alias: &str, _table: &str) -> Result<()> {
        if !self.patch_missing_tables {
            return Err(CompileError::Merge {
                table: alias.to_string(),
            });
        }
        query.add_filter(format!("{alias}.id = 0"));
        Ok(())
    }
}

/// Users attached to nodes through `users.node_id`.
#[derive(Debug, Default)]
pub struct UsersDomain;

impl Domain for UsersDomain {
    fn name(&self) -> &str {
        "users"
    }

    fn main_table(&self) -> &str {
        "users"
    }

    fn main_class(&self) -> &str {
        "User"
    }

    fn default(&self, key: &str) -> Option<String> {
        (key == "order").then(|| String::from("name asc, first_name asc"))
    }

    fn scope_fields(&self, _cx: &Processor<'_>, scope: &str) -> Result<Resolution<ScopeFields>> {
        Ok(match scope {
            "site" => Resolution::Matched(ScopeFields::Unscoped),
            _ => Resolution::NotApplicable,
        })
    }

    fn process_field(&self, cx: &mut Processor<'_>, name: &str) -> Result<Resolution<String>> {
        Ok(if USER_FIELDS.contains(&name) {
            Resolution::Matched(format!("{}.{name}", cx.table()))
        } else {
            Resolution::NotApplicable
        })
    }

    fn class_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        if relation != "objects" {
            return Ok(Resolution::NotApplicable);
        }
        if cx.is_last() {
            if let Some(scope) = cx.default_scope() {
                cx.apply_scope(&scope)?;
            }
        }
        cx.add_table("objects")?;
        let objects = cx
            .table_at("objects", 0)
            .unwrap_or_else(|| String::from("objects"));
        let node_id = cx.field_or_attr("node_id")?;
        cx.add_filter(format!("{objects}.id = {node_id}"));
        cx.change_domain("objects")?;
        Ok(Resolution::Matched(()))
    }
}

/// Catalog with both domains; OR branches lacking `links` get patched.
pub fn catalog() -> Catalog {
    Catalog::new()
        .with_domain(ObjectsDomain {
            patch_missing_tables: true,
        })
        .with_domain(UsersDomain)
}

/// Compiles `source` from the objects domain.
pub fn compile(source: &str) -> Query {
    compile_with(source, &CompileOptions::new())
}

/// Compiles `source` from the objects domain with `options`.
pub fn compile_with(source: &str, options: &CompileOptions) -> Query {
    catalog()
        .compile("objects", source, options)
        .unwrap_or_else(|e| panic!("Failed to compile {source:?}: {e}"))
}

/// Compiles `source` and returns the expected error.
pub fn compile_err(source: &str) -> CompileError {
    match catalog().compile("objects", source, &CompileOptions::new()) {
        Ok(query) => panic!(
            "Expected {source:?} to fail, got {}",
            query.to_s(StatementKind::Find)
        ),
        Err(err) => err,
    }
}

/// Compiles `source` and renders the find statement with its binds.
pub fn to_s(source: &str) -> String {
    compile(source).to_s(StatementKind::Find)
}

/// Compiles `source` and renders the count statement with its binds.
pub fn count_s(source: &str) -> String {
    compile(source).to_s(StatementKind::Count)
}
