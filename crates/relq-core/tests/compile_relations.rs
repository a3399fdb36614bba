//! Tests for relation resolution, scopes and `from` chains.

mod common;
use common::*;

use relq_core::{CompileOptions, StatementKind};

#[test]
fn test_filter_relation_uses_default_scope() {
    assert_eq!(
        to_s("objects"),
        r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ?", id]"#
    );
    assert_eq!(
        to_s("children"),
        r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ?", id]"#
    );
}

#[test]
fn test_empty_source_compiles_main_table() {
    assert_eq!(to_s(""), to_s("objects"));
}

#[test]
fn test_context_relation() {
    assert_eq!(
        to_s("parent"),
        r#"["SELECT objects.* FROM objects WHERE objects.id = ?", parent_id]"#
    );
    assert_eq!(
        to_s("project"),
        r#"["SELECT objects.* FROM objects WHERE objects.id = ?", project_id]"#
    );
}

#[test]
fn test_join_relation_through_links() {
    assert_eq!(
        to_s("icons"),
        concat!(
            r#"["SELECT objects.* FROM links,objects WHERE objects.id = links.source_id "#,
            r#"AND links.relation_id = 5 AND links.target_id = ?", id]"#
        )
    );
}

#[test]
fn test_join_relation_with_join_clause() {
    assert_eq!(
        to_s("tags"),
        r#""SELECT objects.* FROM objects INNER JOIN tags ON objects.id = tags.node_id""#
    );
}

#[test]
fn test_join_relation_twice_gets_a_fresh_alias() {
    assert_eq!(
        to_s("tags from tags"),
        concat!(
            r#""SELECT objects.* FROM objects AS ob1 INNER JOIN tags ON ob1.id = tags.node_id,"#,
            r#"objects INNER JOIN tags AS ta1 ON objects.id = ta1.node_id GROUP BY objects.id""#
        )
    );
}

#[test]
fn test_explicit_scopes() {
    assert_eq!(to_s("objects in site"), r#""SELECT objects.* FROM objects""#);
    assert_eq!(
        to_s("objects in project"),
        r#"["SELECT objects.* FROM objects WHERE objects.project_id = ?", project_id]"#
    );
    assert_eq!(
        to_s("letters in parent"),
        concat!(
            r#"["SELECT objects.* FROM objects WHERE objects.kpath LIKE 'NNL%' "#,
            r#"AND objects.parent_id = ?", parent_id]"#
        )
    );
}

#[test]
fn test_default_scope_override() {
    let site = CompileOptions::new().default_value("scope", "site");
    assert_eq!(
        compile_with("objects", &site).to_s(StatementKind::Find),
        r#""SELECT objects.* FROM objects""#
    );

    let project = CompileOptions::new().default_value("scope", "project");
    assert_eq!(
        compile_with("objects", &project).to_s(StatementKind::Find),
        r#"["SELECT objects.* FROM objects WHERE objects.project_id = ?", project_id]"#
    );
}

#[test]
fn test_from_chain_aliases_inner_occurrences() {
    let site = CompileOptions::new().default_value("scope", "site");
    assert_eq!(
        compile_with("objects from objects", &site).to_s(StatementKind::Find),
        concat!(
            r#""SELECT objects.* FROM objects,objects AS ob1 WHERE objects.parent_id = ob1.id "#,
            r#"GROUP BY objects.id""#
        )
    );
}

#[test]
fn test_three_level_chain() {
    assert_eq!(
        to_s("objects from objects from objects"),
        concat!(
            r#"["SELECT objects.* FROM objects,objects AS ob1,objects AS ob2 "#,
            r#"WHERE objects.parent_id = ob2.id AND ob2.parent_id = ob1.id "#,
            r#"AND ob1.parent_id = ? GROUP BY objects.id", id]"#
        )
    );
}

#[test]
fn test_from_context_relation() {
    assert_eq!(
        to_s("letters from project"),
        concat!(
            r#"["SELECT objects.* FROM objects,objects AS ob1 WHERE objects.kpath LIKE 'NNL%' "#,
            r#"AND objects.parent_id = ob1.id AND ob1.id = ? GROUP BY objects.id", project_id]"#
        )
    );
}

#[test]
fn test_chain_count_is_distinct() {
    let site = CompileOptions::new().default_value("scope", "site");
    assert_eq!(
        compile_with("objects from objects", &site).to_s(StatementKind::Count),
        concat!(
            r#""SELECT COUNT(DISTINCT objects.id) FROM objects,objects AS ob1 "#,
            r#"WHERE objects.parent_id = ob1.id""#
        )
    );
}

#[test]
fn test_main_class_and_table() {
    let query = compile("letters");
    assert_eq!(query.main_table(), "objects");
    assert_eq!(query.main_class(), "Node");

    let query = compile_with("letters", &CompileOptions::new().main_class("Letter"));
    assert_eq!(query.main_class(), "Letter");
}
