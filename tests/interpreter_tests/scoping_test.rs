use jsonlang::{EvalError, JsonLangError, ScopeError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::setup_runtime;

#[test]
fn test_set_local_mutates_outer_binding() {
    let (mut runtime, _) = setup_runtime();
    let context = runtime.context_mut();

    context.enter_scope();
    context.set_local("x", Value::Number(1.0));
    context.enter_scope();
    context.set_local("x", Value::Number(2.0));
    context.exit_scope().unwrap();

    assert_eq!(context.get_local("x").unwrap(), Value::Number(2.0));
}

#[test]
fn test_set_local_inside_branch_reaches_enclosing_frame() {
    let (mut runtime, _) = setup_runtime();
    let result = runtime
        .eval_json(&json!([
            {"set_local": {"name": "x", "value": 1}},
            {"if": {"condition": true, "then": {"set_local": {"name": "x", "value": 2}}}},
            {"local": "x"}
        ]))
        .unwrap();

    assert_eq!(result, Value::Number(2.0));
}

#[test]
fn test_binding_created_in_branch_does_not_outlive_it() {
    let (mut runtime, _) = setup_runtime();
    let err = runtime
        .eval_json(&json!([
            {"if": {"condition": true, "then": {"set_local": {"name": "tmp", "value": 1}}}},
            {"local": "tmp"}
        ]))
        .unwrap_err();

    assert!(matches!(
        err,
        JsonLangError::Eval(EvalError::Scope(ScopeError::VariableNotFound(ref name))) if name == "tmp"
    ));
    assert_eq!(err.kind(), "LookupError");
}

#[test]
fn test_function_cannot_read_caller_locals() {
    let (mut runtime, _) = setup_runtime();
    runtime
        .eval_json(&json!({"def": {"name": "peek", "args": [], "code": {"local": "secret"}}}))
        .unwrap();

    let err = runtime
        .eval_json(&json!([
            {"set_local": {"name": "secret", "value": 42}},
            {"call": "peek"}
        ]))
        .unwrap_err();

    assert_eq!(err.kind(), "LookupError");
}

#[test]
fn test_function_cannot_write_caller_locals() {
    let (mut runtime, _) = setup_runtime();
    runtime
        .eval_json(&json!({"def": {"name": "clobber", "args": [], "code": {"set_local": {"name": "n", "value": 99}}}}))
        .unwrap();

    let result = runtime
        .eval_json(&json!([
            {"set_local": {"name": "n", "value": 1}},
            {"call": "clobber"},
            {"local": "n"}
        ]))
        .unwrap();

    assert_eq!(result, Value::Number(1.0));
}

#[test]
fn test_globals_are_shared_with_functions() {
    let (mut runtime, _) = setup_runtime();
    runtime
        .eval_json(&json!({"def": {"name": "bump", "args": [], "code": {"set": {"name": "count", "value": {"+": [{"var": "count"}, 1]}}}}}))
        .unwrap();
    runtime.set_global("count", Value::Number(0.0));

    runtime.invoke_function("bump", vec![]).unwrap();
    runtime.invoke_function("bump", vec![]).unwrap();

    assert_eq!(runtime.get_global("count").unwrap(), Value::Number(2.0));
}

#[test]
fn test_globals_and_locals_are_separate_namespaces() {
    let (mut runtime, _) = setup_runtime();
    runtime
        .eval_json(&json!([
            {"set": {"name": "x", "value": "global"}},
            {"set_local": {"name": "x", "value": "local"}}
        ]))
        .unwrap();

    assert_eq!(runtime.get_global("x").unwrap(), Value::from("global"));
    assert_eq!(runtime.local_snapshot().get("x"), Some(&Value::from("local")));
}
