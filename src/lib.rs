//! # JsonLang: a tree-walking interpreter for JSON programs
//!
//! Programs are not text. A program is a JSON document whose `code` is a list of
//! single-keyword objects (`{"if": {...}}`, `{"call": "f"}`, `{"+": [1, 2]}`),
//! and the interpreter walks that structure directly.
//!
//! ## Processing Pipeline
//!
//! ```text
//! JSON text → serde_json::Value → Parser (Node) → Evaluator → Value
//! ```
//!
//! - [`parser`] validates a document and builds the closed [`ast::Node`] tree.
//!   Unknown keywords and malformed payloads are rejected here, before anything runs.
//! - [`eval`] walks the tree. It owns the scope chain, the call protocol and the
//!   non-local `return` signal.
//! - [`runtime`] bundles the session state (globals, functions, programs, loader)
//!   behind one facade.
//!
//! ## Program Units and Imports
//!
//! A unit carries a name, global variables, a list of imports and its statements.
//! Importing a unit loads it through the host [`loader::UnitLoader`], registers it in
//! the [`program_registry`], and runs it immediately.
//!
//! ## Front End
//!
//! [`repl`] implements the interactive shell commands; the `jsonlang` binary wires
//! it to a terminal.

pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod function_registry;
pub mod loader;
pub mod native_feature;
pub mod parser;
pub mod program_registry;
pub mod repl;
pub mod runtime;

// Re-exports
pub use ast::*;
pub use error::*;
pub use eval::*;
pub use runtime::Runtime;
