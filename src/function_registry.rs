use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::ast::{Node, Params};
use crate::native_feature::{builtins, NativeFunction};

/// A callable registered under a name.
#[derive(Clone)]
pub enum FunctionDef {
    Native(Rc<dyn NativeFunction>),
    User { params: Params, body: Rc<Node> },
}

impl FunctionDef {
    pub fn is_native(&self) -> bool {
        matches!(self, FunctionDef::Native(_))
    }

    /// Parameter list as shown by the shell: `a b`, `...args`, or `...` for natives.
    pub fn signature(&self) -> String {
        match self {
            FunctionDef::Native(_) => "...".to_string(),
            FunctionDef::User { params, .. } => params.to_string(),
        }
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionDef::Native(_) => write!(f, "Native"),
            FunctionDef::User { params, .. } => f.debug_struct("User").field("params", params).finish(),
        }
    }
}

/// Name → definition table. Defining a name again replaces the old definition.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.define(builtins::PRINT, FunctionDef::Native(Rc::new(builtins::print)));
        registry
    }

    pub fn define(&mut self, name: &str, function: FunctionDef) -> Option<FunctionDef> {
        let previous = self.functions.insert(name.to_string(), function);
        if previous.is_some() {
            debug!(function = name, "function redefined");
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<FunctionDef> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Entries sorted by name.
    pub fn entries(&self) -> Vec<(&str, &FunctionDef)> {
        let mut entries: Vec<_> = self
            .functions
            .iter()
            .map(|(name, function)| (name.as_str(), function))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Drops user-defined functions, keeping natives.
    pub fn retain_natives(&mut self) {
        self.functions.retain(|_, function| function.is_native());
    }
}
