use jsonlang::loader::{FsLoader, LoadError, MemoryLoader, MockUnitLoader};
use jsonlang::{EvalError, Value};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use crate::setup_runtime_with;

fn counter_unit() -> String {
    json!({
        "program": "counter",
        "code": [{"set": {"name": "runs", "value": {"+": [{"var": "runs"}, 1]}}}]
    })
    .to_string()
}

#[test]
fn test_importing_twice_runs_twice() {
    let mut loader = MockUnitLoader::new();
    loader
        .expect_load_unit_text()
        .withf(|reference| reference == "counter")
        .times(2)
        .returning(|_| Ok(counter_unit()));

    let (mut runtime, _) = setup_runtime_with(loader);
    runtime.set_global("runs", Value::Number(0.0));

    runtime
        .eval_json(&json!([{"import": "counter"}, {"import": ["counter"]}]))
        .unwrap();

    assert_eq!(runtime.get_global("runs").unwrap(), Value::Number(2.0));
}

#[test]
fn test_header_imports_run_before_statements() {
    let loader = MemoryLoader::default().with_unit(
        "greeting",
        json!({
            "program": "greeting",
            "variables": {"greeting": "hello"},
            "code": [{"def": {"name": "greet", "args": ["who"], "code": {"+": [{"var": "greeting"}, " ", {"local": "who"}]}}}]
        })
        .to_string(),
    );
    let (mut runtime, output) = setup_runtime_with(loader);

    runtime
        .run_text(
            &json!({
                "program": "main",
                "import": ["greeting"],
                "code": [{"call": {"name": "print", "args": [{"call": {"name": "greet", "args": ["world"]}}]}}]
            })
            .to_string(),
        )
        .unwrap();

    assert_eq!(output.contents(), "hello world\n");
    let names: Vec<_> = runtime
        .programs()
        .list()
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["greeting", "main"]);
}

#[test]
fn test_import_overwrites_same_named_unit() {
    let loader = MemoryLoader::default()
        .with_unit("v1", r#"{"program": "lib", "variables": {"version": 1}}"#)
        .with_unit("v2", r#"{"program": "lib", "variables": {"version": 2}}"#);
    let (mut runtime, _) = setup_runtime_with(loader);

    runtime.import_program("v1").unwrap();
    runtime.import_program("v2").unwrap();
    runtime.set_global("version", Value::Null);
    runtime.run_program("lib").unwrap();

    assert_eq!(runtime.programs().len(), 1);
    assert_eq!(runtime.get_global("version").unwrap(), Value::Number(2.0));
}

#[test]
fn test_missing_unit_is_a_lookup_error() {
    let mut loader = MockUnitLoader::new();
    loader
        .expect_load_unit_text()
        .returning(|reference| Err(LoadError::NotFound(reference.to_string())));

    let (mut runtime, _) = setup_runtime_with(loader);
    let err = runtime.import_program("nowhere").unwrap_err();

    assert!(matches!(err, EvalError::Import { ref reference, .. } if reference == "nowhere"));
    assert_eq!(err.kind().to_string(), "LookupError");
}

#[test]
fn test_malformed_unit_reports_its_reference() {
    let loader = MemoryLoader::default().with_unit("broken", r#"{"code": [{"while": 1}]}"#);
    let (mut runtime, _) = setup_runtime_with(loader);

    let err = runtime.import_program("broken").unwrap_err();
    assert!(matches!(err, EvalError::InvalidUnit { ref reference, .. } if reference == "broken"));
    assert_eq!(err.kind().to_string(), "ShapeError");
}

#[test]
fn test_filesystem_imports() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("lib")).unwrap();
    std::fs::write(
        dir.path().join("lib/math.json"),
        json!({
            "program": "math",
            "code": [{"def": {"name": "square", "args": ["x"], "code": {"*": [{"local": "x"}, {"local": "x"}]}}}]
        })
        .to_string(),
    )
    .unwrap();

    let (mut runtime, _) = setup_runtime_with(FsLoader::new(dir.path(), "json"));
    let result = runtime
        .run_text(r#"{"import": "lib/math", "code": [{"call": {"name": "square", "args": [7]}}]}"#)
        .unwrap();

    assert_eq!(result, Value::Number(49.0));
}
