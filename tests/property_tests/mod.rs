use jsonlang::Value;
use proptest::prelude::*;
use serde_json::json;

use crate::setup_runtime;

fn counted(operand: &serde_json::Value) -> serde_json::Value {
    json!([
        {"set": {"name": "evaluated", "value": {"+": [{"var": "evaluated"}, 1]}}},
        operand
    ])
}

proptest! {
    #[test]
    fn subtraction_is_a_left_fold(values in prop::collection::vec(-1000i32..1000, 1..12)) {
        let (mut runtime, _) = setup_runtime();
        let result = runtime.eval_json(&json!({"-": values})).unwrap();

        let expected = values[1..]
            .iter()
            .fold(values[0] as f64, |acc, v| acc - *v as f64);
        prop_assert_eq!(result, Value::Number(expected));
    }

    #[test]
    fn every_operand_is_evaluated_once(values in prop::collection::vec(0i32..100, 1..12)) {
        let (mut runtime, _) = setup_runtime();
        runtime.set_global("evaluated", Value::Number(0.0));

        let operands: Vec<_> = values.iter().map(|v| counted(&json!(v))).collect();
        let result = runtime.eval_json(&json!({"+": operands})).unwrap();

        let sum: i32 = values.iter().sum();
        prop_assert_eq!(result, Value::Number(sum as f64));
        prop_assert_eq!(
            runtime.get_global("evaluated").unwrap(),
            Value::Number(values.len() as f64)
        );
    }

    #[test]
    fn logical_folds_match_truthiness(flags in prop::collection::vec(any::<bool>(), 1..10)) {
        let (mut runtime, _) = setup_runtime();
        runtime.set_global("evaluated", Value::Number(0.0));

        let operands: Vec<_> = flags.iter().map(|f| counted(&json!(f))).collect();
        let all = runtime.eval_json(&json!({"and": operands.clone()})).unwrap();
        let any = runtime.eval_json(&json!({"or": operands})).unwrap();

        prop_assert_eq!(all, Value::Boolean(flags.iter().all(|f| *f)));
        prop_assert_eq!(any, Value::Boolean(flags.iter().any(|f| *f)));
        prop_assert_eq!(
            runtime.get_global("evaluated").unwrap(),
            Value::Number(2.0 * flags.len() as f64)
        );
    }
}
