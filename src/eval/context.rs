use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};

use thiserror::Error;
use tracing::debug;

use super::evaluator::{EvalError, EvalResult};
use super::value::Value;
use crate::function_registry::FunctionRegistry;
use crate::loader::UnitLoader;
use crate::program_registry::ProgramRegistry;

/// Index of a frame in the [`ScopeStack`] arena.
pub type FrameId = usize;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScopeError {
    #[error("local variable '{0}' is not defined")]
    VariableNotFound(String),
    #[error("cannot exit the root scope")]
    RootScope,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    variables: HashMap<String, Value>,
    parent: Option<FrameId>,
}

impl Frame {
    fn with_parent(parent: Option<FrameId>) -> Self {
        Self {
            variables: HashMap::new(),
            parent,
        }
    }
}

/// Arena of local-binding frames.
///
/// Frames are pushed and popped strictly LIFO, so the current frame is always the
/// last one and a parent index always points below its child. A frame pushed by
/// [`push_call_scope`](Self::push_call_scope) has no parent: lookups from inside a
/// function body never reach the caller's frames.
///
/// Writes follow one rule: if any frame on the chain already binds the name, that
/// binding is overwritten in place; otherwise the name is created in the current
/// frame. A name bound in an outer frame therefore can never be shadowed by an
/// inner `set_local`.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn current(&self) -> FrameId {
        self.frames.len() - 1
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// New frame nested in the current one.
    pub fn push_scope(&mut self) -> FrameId {
        let parent = self.current();
        self.frames.push(Frame::with_parent(Some(parent)));
        debug!(depth = self.depth(), "enter scope");
        self.current()
    }

    /// New chain root for a function call.
    pub fn push_call_scope(&mut self) -> FrameId {
        self.frames.push(Frame::with_parent(None));
        debug!(depth = self.depth(), "enter call scope");
        self.current()
    }

    pub fn pop_scope(&mut self) -> Result<Frame, ScopeError> {
        if self.frames.len() <= 1 {
            return Err(ScopeError::RootScope);
        }
        let frame = self.frames.pop().ok_or(ScopeError::RootScope)?;
        debug!(depth = self.depth(), "exit scope");
        Ok(frame)
    }

    /// Frames visible from the current one, innermost first.
    fn chain(&self) -> impl Iterator<Item = FrameId> + '_ {
        std::iter::successors(Some(self.current()), |id| self.frames[*id].parent)
    }

    fn find(&self, name: &str) -> Option<FrameId> {
        self.chain()
            .find(|id| self.frames[*id].variables.contains_key(name))
    }

    pub fn lookup(&self, name: &str) -> Result<Value, ScopeError> {
        self.find(name)
            .and_then(|id| self.frames[id].variables.get(name).cloned())
            .ok_or_else(|| ScopeError::VariableNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Overwrites the nearest existing binding, or creates one in the current frame.
    pub fn assign(&mut self, name: &str, value: Value) {
        let target = self.find(name).unwrap_or_else(|| self.current());
        self.frames[target].variables.insert(name.to_string(), value);
    }

    /// Binds in the current frame regardless of outer bindings.
    pub fn declare(&mut self, name: &str, value: Value) {
        let current = self.current();
        self.frames[current].variables.insert(name.to_string(), value);
    }

    /// Every binding visible from the current frame; inner frames win.
    pub fn visible(&self) -> BTreeMap<String, Value> {
        let mut visible = BTreeMap::new();
        for id in self.chain() {
            for (name, value) in &self.frames[id].variables {
                visible
                    .entry(name.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        visible
    }
}

/// Nesting limit for user function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Session state threaded through evaluation.
///
/// Globals and frame bindings are separate namespaces: `var`/`set` touch only
/// `globals`, `local`/`set_local` touch only `scopes`.
pub struct ExecutionContext {
    pub globals: HashMap<String, Value>,
    pub scopes: ScopeStack,
    pub functions: FunctionRegistry,
    pub programs: ProgramRegistry,
    loader: Box<dyn UnitLoader>,
    output: Box<dyn Write>,
    call_depth: usize,
    max_call_depth: usize,
}

impl ExecutionContext {
    pub fn new(loader: Box<dyn UnitLoader>) -> Self {
        Self {
            globals: HashMap::new(),
            scopes: ScopeStack::new(),
            functions: FunctionRegistry::with_builtins(),
            programs: ProgramRegistry::default(),
            loader,
            output: Box::new(io::stdout()),
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn set_output(&mut self, output: Box<dyn Write>) {
        self.output = output;
    }

    pub fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    pub fn get_global(&self, name: &str) -> EvalResult<Value> {
        self.globals
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedGlobal(name.to_string()))
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    pub fn get_local(&self, name: &str) -> EvalResult<Value> {
        self.scopes.lookup(name).map_err(EvalError::from)
    }

    pub fn set_local(&mut self, name: &str, value: Value) {
        self.scopes.assign(name, value);
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push_scope();
    }

    pub fn exit_scope(&mut self) -> EvalResult<()> {
        self.scopes.pop_scope()?;
        Ok(())
    }

    pub fn set_max_call_depth(&mut self, max_call_depth: usize) {
        self.max_call_depth = max_call_depth;
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    /// Counts one more active user call, refusing once the limit is reached.
    pub fn enter_call(&mut self) -> EvalResult<()> {
        if self.call_depth >= self.max_call_depth {
            return Err(EvalError::RecursionLimit(self.max_call_depth));
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub fn load_unit_text(&self, reference: &str) -> EvalResult<String> {
        self.loader
            .load_unit_text(reference)
            .map_err(|source| EvalError::Import {
                reference: reference.to_string(),
                source,
            })
    }

    /// Drops all program state; natives and the loader are kept.
    pub fn reset(&mut self) {
        self.globals.clear();
        self.scopes = ScopeStack::new();
        self.call_depth = 0;
        self.functions.retain_natives();
        self.programs = ProgramRegistry::default();
    }
}
