//! JsonLang Evaluation System
//!
//! Executes validated [`Node`](crate::ast::Node) trees against an
//! [`ExecutionContext`](context::ExecutionContext).
//!
//! # Core Components
//!
//! ## Evaluator
//! Dispatches a node to its construct. Stateless; all mutable state lives in the
//! context that is threaded through every call.
//!
//! ## Statement Evaluation
//! Blocks, bindings, control flow (`if`, `for`, `while`, `switch`), function
//! definition and program import/run.
//!
//! ## Expression Evaluation
//! Operator folds, list construction and the function call protocol.
//!
//! ## Execution Context
//! Globals, the scope arena, the function and program registries, the unit
//! loader and the output sink.
//!
//! # Control Flow
//!
//! `return` is not an error and not a panic. Every evaluation yields a
//! [`StatementResult`](statement::StatementResult); a `Return` result is passed
//! upward untouched by blocks and loops until a function call (or the top of a
//! program run) turns it back into a plain value.

/// Unwraps a `StatementResult::Value`, or returns any control signal to the caller.
macro_rules! value_or_return {
    ($result:expr) => {
        match $result {
            $crate::eval::statement::StatementResult::Value(value) => value,
            control => return Ok(control),
        }
    };
}

pub mod context;
pub mod evaluator;
pub mod expression;
pub mod statement;
pub mod value;

pub use context::{ExecutionContext, ScopeError, ScopeStack, DEFAULT_MAX_CALL_DEPTH};
pub use evaluator::{ErrorKind, EvalError, EvalResult, Evaluator};
pub use statement::StatementResult;
pub use value::Value;
