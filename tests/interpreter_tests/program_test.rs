use jsonlang::{ErrorKind, JsonLangError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::setup_runtime;

#[test]
fn test_program_document_defaults() {
    let (mut runtime, _) = setup_runtime();
    let result = runtime.run_text("{}").unwrap();

    assert_eq!(result, Value::Null);
    assert!(runtime.programs().get("program").is_some());
}

#[test]
fn test_variables_merge_into_globals() {
    let (mut runtime, _) = setup_runtime();
    runtime.set_global("keep", Value::Boolean(true));
    runtime.set_global("limit", Value::Number(1.0));

    runtime
        .run_text(
            &json!({
                "program": "config",
                "variables": {"limit": 10, "names": ["a", "b"]}
            })
            .to_string(),
        )
        .unwrap();

    assert_eq!(runtime.get_global("keep").unwrap(), Value::Boolean(true));
    assert_eq!(runtime.get_global("limit").unwrap(), Value::Number(10.0));
    assert_eq!(
        runtime.get_global("names").unwrap(),
        Value::List(vec![Value::from("a"), Value::from("b")])
    );
}

#[test]
fn test_top_level_return_ends_the_unit() {
    let (mut runtime, output) = setup_runtime();
    let result = runtime
        .run_text(
            &json!({"code": [
                {"return": "early"},
                {"call": {"name": "print", "args": ["unreachable"]}}
            ]})
            .to_string(),
        )
        .unwrap();

    assert_eq!(result, Value::from("early"));
    assert_eq!(output.contents(), "");
}

#[test]
fn test_running_a_unit_twice_reexecutes_it() {
    let (mut runtime, output) = setup_runtime();
    runtime
        .load_program_text(
            &json!({"program": "hello", "code": [{"call": {"name": "print", "args": ["hi"]}}]})
                .to_string(),
        )
        .unwrap();

    runtime.run_program("hello").unwrap();
    runtime.run_program("hello").unwrap();

    assert_eq!(output.contents(), "hi\nhi\n");
}

#[test]
fn test_unknown_keyword_is_rejected_before_running() {
    let (mut runtime, output) = setup_runtime();
    let err = runtime
        .run_text(
            &json!({"code": [
                {"call": {"name": "print", "args": ["never"]}},
                {"eval": "1 + 1"}
            ]})
            .to_string(),
        )
        .unwrap_err();

    assert!(matches!(err, JsonLangError::AST(ref e) if e.kind() == ErrorKind::UnknownConstruct));
    assert_eq!(output.contents(), "");
    assert!(runtime.programs().is_empty());
}

#[test]
fn test_malformed_payload_is_a_shape_error() {
    let (mut runtime, _) = setup_runtime();
    for document in [
        json!({"if": [true]}),
        json!({"for": {"range": [1, 2], "code": []}}),
        json!({"set": {"name": "x"}}),
        json!({"switch": {"value": 1, "case": []}}),
        json!({}),
        json!({"+": [1], "-": [2]}),
    ] {
        let err = runtime.eval_json(&document).unwrap_err();
        assert_eq!(err.kind(), "ShapeError", "document: {}", document);
    }
}

#[test]
fn test_run_unknown_program() {
    let (mut runtime, _) = setup_runtime();
    let err = runtime.run_program("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
}

#[test]
fn test_failure_leaves_partial_state() {
    let (mut runtime, _) = setup_runtime();
    let err = runtime
        .run_text(
            &json!({"code": [
                {"set": {"name": "before", "value": 1}},
                {"call": "missing"},
                {"set": {"name": "after", "value": 2}}
            ]})
            .to_string(),
        )
        .unwrap_err();

    assert_eq!(err.kind(), "LookupError");
    assert_eq!(runtime.get_global("before").unwrap(), Value::Number(1.0));
    assert!(runtime.get_global("after").is_err());
}
