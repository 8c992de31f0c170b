use thiserror::Error;

use super::context::{ExecutionContext, ScopeError};
use super::statement::StatementResult;
use super::value::Value;
use crate::ast::{ASTError, Node, Operator};
use crate::loader::LoadError;

/// Error categories reported to the user, e.g. `LookupError: ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    #[strum(to_string = "LookupError")]
    Lookup,
    #[strum(to_string = "ArityError")]
    Arity,
    #[strum(to_string = "ShapeError")]
    Shape,
    #[strum(to_string = "UnknownConstructError")]
    UnknownConstruct,
    #[strum(to_string = "TypeError")]
    Type,
    #[strum(to_string = "RuntimeError")]
    Runtime,
}

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("global variable '{0}' is not defined")]
    UndefinedGlobal(String),
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("function '{0}' is not defined")]
    UnknownFunction(String),
    #[error("program '{0}' is not loaded")]
    ProgramNotFound(String),
    #[error("Function {function} expected {expected} arguments, but got {actual}")]
    ArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[error("operator '{operator}' cannot be applied to {left} and {right}")]
    TypeMismatch {
        operator: Operator,
        left: &'static str,
        right: &'static str,
    },
    #[error("cannot import '{reference}': {source}")]
    Import {
        reference: String,
        #[source]
        source: LoadError,
    },
    #[error("unit '{reference}' is malformed: {source}")]
    InvalidUnit {
        reference: String,
        #[source]
        source: ASTError,
    },
    #[error(transparent)]
    Parse(#[from] ASTError),
    #[error("native function '{function}' failed: {message}")]
    Native { function: String, message: String },
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
    #[error("maximum call depth of {0} exceeded")]
    RecursionLimit(usize),
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::UndefinedGlobal(_)
            | EvalError::Scope(ScopeError::VariableNotFound(_))
            | EvalError::UnknownFunction(_)
            | EvalError::ProgramNotFound(_)
            | EvalError::Import { .. } => ErrorKind::Lookup,
            EvalError::ArityMismatch { .. } => ErrorKind::Arity,
            EvalError::TypeMismatch { .. } => ErrorKind::Type,
            EvalError::InvalidUnit { source, .. } | EvalError::Parse(source) => source.kind(),
            EvalError::Scope(ScopeError::RootScope)
            | EvalError::Native { .. }
            | EvalError::Io(_)
            | EvalError::RecursionLimit(_) => ErrorKind::Runtime,
        }
    }

    pub fn native(function: &str, message: impl Into<String>) -> Self {
        EvalError::Native {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Tree-walking evaluator.
///
/// Holds no state of its own; statement constructs live in
/// [`statement`](super::statement), operators and calls in
/// [`expression`](super::expression).
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Top level entry point: evaluates one node.
    pub fn eval_node(
        &self,
        node: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        match node {
            Node::Literal(value) => Ok(StatementResult::Value(value.clone())),
            Node::Block(nodes) => self.eval_block(nodes, context),
            Node::Var(name) => context.get_global(name).map(StatementResult::Value),
            Node::Local { name, value } => self.eval_local(name, value.as_deref(), context),
            Node::Set { name, value } => self.eval_set(name, value, context),
            Node::SetLocal { name, value } => self.eval_set_local(name, value, context),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => self.eval_if(condition, then_branch, else_branch.as_deref(), context),
            Node::For {
                init,
                condition,
                step,
                code,
            } => self.eval_for(init, condition, step, code, context),
            Node::While { condition, code } => self.eval_while(condition, code, context),
            Node::Switch { value, cases } => self.eval_switch(value, cases, context),
            Node::Def { name, params, code } => self.eval_def(name, params, code, context),
            Node::Call { name, args } => self.eval_call(name, args, context),
            Node::Return(value) => self.eval_return(value, context),
            Node::Import(references) => self.eval_import(references, context),
            Node::List(items) => self.eval_list(items, context),
            Node::Operation { op, operands } => self.eval_operation(*op, operands, context),
            Node::Comment => Ok(StatementResult::Value(Value::Null)),
        }
    }

    /// Evaluates a node where only a value makes sense (shell input, host calls).
    /// A `return` reaching this point simply yields its value.
    pub fn eval_value(&self, node: &Node, context: &mut ExecutionContext) -> EvalResult<Value> {
        self.eval_node(node, context).map(StatementResult::into_value)
    }
}
