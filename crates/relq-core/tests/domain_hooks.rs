//! Tests for the optional domain hooks: lifecycle callbacks and equality
//! rewriting.

use relq_core::{
    Catalog, CompileOptions, Domain, Processor, Resolution, Result, ScopeFields, Sexp,
    StatementKind,
};

/// Pages hidden behind a visibility flag, with `id = null` rewritten to
/// `IS NULL`.
struct PagesDomain;

impl Domain for PagesDomain {
    fn name(&self) -> &str {
        "pages"
    }

    fn main_table(&self) -> &str {
        "pages"
    }

    fn main_class(&self) -> &str {
        "Page"
    }

    fn scope_fields(&self, _cx: &Processor<'_>, scope: &str) -> Result<Resolution<ScopeFields>> {
        Ok(match scope {
            "site" => Resolution::Matched(ScopeFields::Unscoped),
            _ => Resolution::NotApplicable,
        })
    }

    fn default(&self, key: &str) -> Option<String> {
        (key == "scope").then(|| String::from("site"))
    }

    fn process_field(&self, cx: &mut Processor<'_>, name: &str) -> Result<Resolution<String>> {
        Ok(match name {
            "id" | "title" => Resolution::Matched(format!("{}.{name}", cx.table())),
            _ => Resolution::NotApplicable,
        })
    }

    fn filter_relation(&self, cx: &mut Processor<'_>, relation: &str) -> Result<Resolution> {
        if relation != "pages" {
            return Ok(Resolution::NotApplicable);
        }
        cx.add_table("pages")?;
        Ok(Resolution::Matched(()))
    }

    fn process_equal(
        &self,
        cx: &mut Processor<'_>,
        left: &Sexp,
        right: &Sexp,
    ) -> Result<Resolution<String>> {
        let right_sql = cx.process(right)?;
        if right_sql != "NULL" {
            return Ok(Resolution::NotApplicable);
        }
        let left_sql = cx.process(left)?;
        Ok(Resolution::Matched(format!("{left_sql} IS NULL")))
    }

    fn before_process(&self, cx: &mut Processor<'_>) -> Result<()> {
        cx.add_filter("pages.deleted_at IS NULL");
        Ok(())
    }

    fn after_process(&self, cx: &mut Processor<'_>) -> Result<()> {
        let table = cx.table();
        cx.add_filter(format!("{table}.visible = 1"));
        Ok(())
    }
}

fn compile(source: &str) -> String {
    Catalog::new()
        .with_domain(PagesDomain)
        .compile("pages", source, &CompileOptions::new())
        .unwrap_or_else(|e| panic!("Failed to compile {source:?}: {e}"))
        .to_s(StatementKind::Find)
}

#[test]
fn test_lifecycle_hooks_add_filters() {
    assert_eq!(
        compile("pages"),
        r#""SELECT pages.* FROM pages WHERE pages.visible = 1 AND pages.deleted_at IS NULL""#
    );
}

#[test]
fn test_equal_hook_rewrites_null_comparison() {
    assert_eq!(
        compile("pages where title = null"),
        concat!(
            r#""SELECT pages.* FROM pages WHERE pages.visible = 1 "#,
            r#"AND pages.title IS NULL AND pages.deleted_at IS NULL""#
        )
    );
}

#[test]
fn test_equal_hook_declines_other_comparisons() {
    assert_eq!(
        compile("pages where id = 3"),
        concat!(
            r#""SELECT pages.* FROM pages WHERE pages.visible = 1 "#,
            r#"AND pages.id = 3 AND pages.deleted_at IS NULL""#
        )
    );
}
