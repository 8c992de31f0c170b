use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use jsonlang::{ErrorKind, EvalResult, JsonLangError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::setup_runtime;

/// Registers `tick`, which records each call and returns its ordinal.
fn register_tick(runtime: &mut jsonlang::Runtime) -> Rc<RefCell<Vec<f64>>> {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let recorded = calls.clone();
    runtime.register_native("tick", move |_: &mut dyn Write, _: &[Value]| -> EvalResult<Value> {
        let mut calls = recorded.borrow_mut();
        let ordinal = calls.len() as f64 + 1.0;
        calls.push(ordinal);
        Ok(Value::Number(ordinal))
    });
    calls
}

#[test]
fn test_fold_evaluates_each_operand_once_in_order() {
    let (mut runtime, _) = setup_runtime();
    let calls = register_tick(&mut runtime);

    // (1 - 2) - 3
    let result = runtime
        .eval_json(&json!({"-": [{"call": "tick"}, {"call": "tick"}, {"call": "tick"}]}))
        .unwrap();

    assert_eq!(result, Value::Number(-4.0));
    assert_eq!(*calls.borrow(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_division_fold_is_left_associative() {
    let (mut runtime, _) = setup_runtime();
    // (64 / 4) / 2, not 64 / (4 / 2)
    let result = runtime.eval_json(&json!({"div": [64, 4, 2]})).unwrap();
    assert_eq!(result, Value::Number(8.0));
}

#[test]
fn test_sum_round_trip() {
    let (mut runtime, _) = setup_runtime();
    assert_eq!(
        runtime.eval_json(&json!({"+": [1, 2, 3]})).unwrap(),
        Value::Number(6.0)
    );
}

#[test]
fn test_logical_and_evaluates_every_operand() {
    let (mut runtime, _) = setup_runtime();
    let calls = register_tick(&mut runtime);

    let result = runtime
        .eval_json(&json!({"&&": [
            [{"call": "tick"}, true],
            [{"call": "tick"}, false],
            [{"call": "tick"}, true]
        ]}))
        .unwrap();

    assert_eq!(result, Value::Boolean(false));
    assert_eq!(calls.borrow().len(), 3);
}

#[test]
fn test_logical_or_evaluates_every_operand() {
    let (mut runtime, _) = setup_runtime();
    let calls = register_tick(&mut runtime);

    let result = runtime
        .eval_json(&json!({"||": [true, {"call": "tick"}]}))
        .unwrap();

    assert_eq!(result, Value::Boolean(true));
    assert_eq!(calls.borrow().len(), 1);
}

#[test]
fn test_comparison_chains_on_the_previous_result() {
    let (mut runtime, _) = setup_runtime();
    // (3 < 2) < true  →  false < true
    let result = runtime.eval_json(&json!({"<": [3, 2, true]})).unwrap();
    assert_eq!(result, Value::Boolean(true));
}

#[test]
fn test_chained_boolean_meets_number_as_zero_or_one() {
    let (mut runtime, _) = setup_runtime();
    for (expr, expected) in [
        // (1 < 2) < 3  →  1 < 3
        (json!({"<": [1, 2, 3]}), true),
        // (2 == 2) == 1  →  1 == 1
        (json!({"==": [2, 2, 1]}), true),
        // (3 > 2) > 0  →  1 > 0
        (json!({">": [3, 2, 0]}), true),
        (json!({"==": [1, true]}), true),
        (json!({"==": [false, 0]}), true),
        (json!({"!=": [2, true]}), true),
        (json!({"==": ["1", true]}), false),
    ] {
        assert_eq!(
            runtime.eval_json(&expr).unwrap(),
            Value::Boolean(expected),
            "{expr}"
        );
    }

    let err = runtime.eval_json(&json!({"+": [1, true]})).unwrap_err();
    assert_eq!(err.kind(), "TypeError");
}

#[test]
fn test_single_operand_is_returned_unchanged() {
    let (mut runtime, _) = setup_runtime();
    assert_eq!(
        runtime.eval_json(&json!({"==": ["only"]})).unwrap(),
        Value::from("only")
    );
}

#[test]
fn test_empty_operand_list_is_a_shape_error() {
    let (mut runtime, _) = setup_runtime();
    let err = runtime.eval_json(&json!({"+": []})).unwrap_err();
    assert!(matches!(err, JsonLangError::AST(ref e) if e.kind() == ErrorKind::Shape));
    assert_eq!(err.kind(), "ShapeError");
}

#[test]
fn test_mixed_operands_are_a_type_error() {
    let (mut runtime, _) = setup_runtime();
    let err = runtime.eval_json(&json!({"*": ["a", 2]})).unwrap_err();
    assert_eq!(err.kind(), "TypeError");
}
