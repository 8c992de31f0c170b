use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::ast::Program;
use crate::config::RuntimeConfig;
use crate::eval::context::ExecutionContext;
use crate::eval::evaluator::{EvalResult, Evaluator};
use crate::eval::value::Value;
use crate::function_registry::{FunctionDef, FunctionRegistry};
use crate::loader::{FsLoader, LoadError, UnitLoader};
use crate::native_feature::NativeFunction;
use crate::parser::{parse_node, parse_program, parse_statement};
use crate::program_registry::ProgramRegistry;
use crate::InternalResult;

/// One interpreter session: globals, frames, functions, programs and the host
/// capabilities (loader, output sink) they run against.
pub struct Runtime {
    evaluator: Evaluator,
    context: ExecutionContext,
}

impl Runtime {
    pub fn new(loader: Box<dyn UnitLoader>) -> Self {
        Self {
            evaluator: Evaluator::new(),
            context: ExecutionContext::new(loader),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        let mut runtime = Self::new(Box::new(FsLoader::from_config(config)));
        runtime.set_max_call_depth(config.max_call_depth);
        runtime
    }

    /// Limits how deeply user functions may nest before a call fails.
    pub fn set_max_call_depth(&mut self, max_call_depth: usize) {
        self.context.set_max_call_depth(max_call_depth);
    }

    /// Redirects `print` and other natives away from stdout.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.context.set_output(output);
        self
    }

    pub fn register_native<F>(&mut self, name: &str, function: F)
    where
        F: NativeFunction + 'static,
    {
        debug!(function = name, "register native");
        self.context
            .functions
            .define(name, FunctionDef::Native(Rc::new(function)));
    }

    pub fn add_program(&mut self, program: Program) {
        self.context.programs.register(program);
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run_program(&mut self, name: &str) -> EvalResult<Value> {
        self.evaluator.run_program(name, &mut self.context)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn import_program(&mut self, reference: &str) -> EvalResult<Value> {
        self.evaluator.import_program(reference, &mut self.context)
    }

    /// Parses and registers a unit without running it. Returns its name.
    pub fn load_program_text(&mut self, text: &str) -> InternalResult<String> {
        let program = parse_program(text)?;
        let name = program.name.clone();
        self.add_program(program);
        Ok(name)
    }

    pub fn load_program_file<P: AsRef<Path>>(&mut self, path: P) -> InternalResult<String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_program_text(&text)
    }

    /// Parses, registers and runs a unit.
    pub fn run_text(&mut self, text: &str) -> InternalResult<Value> {
        let name = self.load_program_text(text)?;
        Ok(self.run_program(&name)?)
    }

    /// Evaluates one node at the top level.
    pub fn eval_json(&mut self, json: &JsonValue) -> InternalResult<Value> {
        let node = parse_node(json)?;
        Ok(self.evaluator.eval_value(&node, &mut self.context)?)
    }

    pub fn run_statement(&mut self, text: &str) -> InternalResult<Value> {
        let node = parse_statement(text)?;
        Ok(self.evaluator.eval_value(&node, &mut self.context)?)
    }

    pub fn invoke_function(&mut self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        self.evaluator.invoke(name, args, &mut self.context)
    }

    pub fn globals(&self) -> &HashMap<String, Value> {
        &self.context.globals
    }

    pub fn get_global(&self, name: &str) -> EvalResult<Value> {
        self.context.get_global(name)
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.context.set_global(name, value);
    }

    /// Local bindings visible from the current frame.
    pub fn local_snapshot(&self) -> BTreeMap<String, Value> {
        self.context.scopes.visible()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.context.functions
    }

    pub fn programs(&self) -> &ProgramRegistry {
        &self.context.programs
    }

    pub fn context_mut(&mut self) -> &mut ExecutionContext {
        &mut self.context
    }

    /// Forgets globals, locals, user functions and programs.
    pub fn reset(&mut self) {
        self.context.reset();
    }
}
