//! Tests for compile errors.

mod common;
use common::*;

use relq_core::{CompileError, CompileOptions};

#[test]
fn test_unknown_relation() {
    let err = compile_err("foo");
    assert_eq!(err, CompileError::UnknownRelation(String::from("foo")));
    assert_eq!(err.to_string(), "Unknown relation 'foo'.");

    let err = compile_err("objects from foo");
    assert_eq!(err, CompileError::UnknownRelation(String::from("foo")));
}

#[test]
fn test_unknown_field() {
    let err = compile_err("objects where bar = 1");
    assert_eq!(err.to_string(), "Unknown field 'bar'.");
}

#[test]
fn test_invalid_scope() {
    let err = compile_err("objects in foo");
    assert_eq!(err, CompileError::InvalidScope(String::from("foo")));
    assert_eq!(err.to_string(), "Invalid scope 'foo'.");
}

#[test]
fn test_function_not_allowed() {
    let err = compile_err("objects where event_at.drop = 1");
    assert_eq!(err, CompileError::FunctionNotAllowed(String::from("drop")));
}

#[test]
fn test_unsupported_operator() {
    let err = compile_err("objects where ~ id");
    assert!(matches!(err, CompileError::UnsupportedOperator(_)));
}

#[test]
fn test_syntax_error() {
    let err = compile_err("this is a bad source");
    assert!(matches!(err, CompileError::Syntax(_)));
    assert_eq!(err.to_string(), "Syntax error near 'is a bad source'.");
}

#[test]
fn test_unknown_start_domain() {
    let err = catalog()
        .compile("pages", "objects", &CompileOptions::new())
        .unwrap_err();
    assert_eq!(err, CompileError::UnknownDomain(String::from("pages")));
}

#[test]
fn test_resolver_failure_is_wrapped() {
    let err = compile_err("broken");
    assert_eq!(
        err,
        CompileError::Failed {
            input: String::from("broken"),
            message: String::from("missing table definition"),
        }
    );
    assert_eq!(
        err.to_string(),
        "Failed to compile 'broken': missing table definition"
    );
}
