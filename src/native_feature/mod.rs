/// Native layer
///
/// Host-provided functions that run directly on their argument list instead of
/// evaluating a body. A fresh runtime ships exactly one: `print`.
/// Embedders add their own through
/// [`Runtime::register_native`](crate::runtime::Runtime::register_native).
pub mod builtins;
pub mod types;

pub use types::NativeFunction;
