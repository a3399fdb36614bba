//! Tests for ordering, grouping and pagination clauses.

mod common;
use common::*;

use relq_core::{CompileError, CompileOptions, StatementKind};

#[test]
fn test_order_by() {
    assert_eq!(
        to_s("objects order by name desc, id"),
        r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ? ORDER BY objects.name DESC, objects.id", id]"#
    );
}

#[test]
fn test_default_order_from_options() {
    let options = CompileOptions::new().default_value("order", "kpath asc");
    assert_eq!(
        compile_with("objects", &options).order(),
        Some(" ORDER BY objects.kpath ASC")
    );
    assert_eq!(
        compile_with("objects order by id", &options).order(),
        Some(" ORDER BY objects.id")
    );
}

#[test]
fn test_group_by_and_having() {
    let query = compile("objects group by kpath having id > 3");
    assert_eq!(
        query.to_s(StatementKind::Find),
        concat!(
            r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ? "#,
            r#"GROUP BY objects.kpath HAVING objects.id > 3", id]"#
        )
    );
}

#[test]
fn test_grouped_count() {
    assert_eq!(
        count_s("objects group by section_id"),
        concat!(
            r#"["SELECT COUNT(DISTINCT COALESCE(objects.section_id,0)) FROM objects "#,
            r#"WHERE objects.parent_id = ?", id]"#
        )
    );
    assert_eq!(
        count_s("objects"),
        r#"["SELECT COUNT(*) FROM objects WHERE objects.parent_id = ?", id]"#
    );
}

#[test]
fn test_limit_and_offset() {
    assert_eq!(
        compile("objects limit 5").limit(),
        Some(" LIMIT 5")
    );

    let query = compile("objects limit 2, 10");
    assert_eq!(query.limit(), Some(" LIMIT 10"));
    assert_eq!(query.offset(), Some(" OFFSET 2"));

    let query = compile("objects limit 5 offset 3");
    assert_eq!(
        query.to_s(StatementKind::Find),
        r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ? LIMIT 5 OFFSET 3", id]"#
    );
}

#[test]
fn test_default_limit() {
    let options = CompileOptions::new().limit(20);
    assert_eq!(compile_with("objects", &options).limit(), Some(" LIMIT 20"));
    assert_eq!(
        compile_with("objects limit 5", &options).limit(),
        Some(" LIMIT 5")
    );
}

#[test]
fn test_paginate() {
    let query = compile("objects limit 10 paginate page");
    assert_eq!(
        query.to_s(StatementKind::Find),
        concat!(
            r#"["SELECT objects.* FROM objects WHERE objects.parent_id = ? LIMIT 10 OFFSET ?", "#,
            r#"id, (max(page,1)-1)*10]"#
        )
    );
    assert_eq!(query.page_size(), Some(10));
    assert_eq!(query.pagination_key(), Some("page"));
}

#[test]
fn test_paginate_page_size_is_at_least_one() {
    let query = compile("objects limit 0 paginate p");
    assert_eq!(query.page_size(), Some(1));
    assert_eq!(query.offset(), Some(" OFFSET [[(max(p,1)-1)*1]]"));
}

#[test]
fn test_offset_requires_limit() {
    assert_eq!(
        compile_err("objects offset 3"),
        CompileError::Pagination(String::from("Invalid offset (used without limit)."))
    );
}

#[test]
fn test_paginate_requires_limit() {
    let err = compile_err("objects paginate page");
    assert_eq!(err.to_string(), "Invalid paginate clause (used without limit).");
}
