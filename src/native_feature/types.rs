use std::io::Write;

use crate::eval::evaluator::EvalResult;
use crate::eval::value::Value;

/// A function implemented by the host.
///
/// `output` is the runtime's output sink (stdout unless redirected), so natives
/// that print stay capturable.
pub trait NativeFunction {
    fn call(&self, output: &mut dyn Write, args: &[Value]) -> EvalResult<Value>;
}

impl<F> NativeFunction for F
where
    F: Fn(&mut dyn Write, &[Value]) -> EvalResult<Value>,
{
    fn call(&self, output: &mut dyn Write, args: &[Value]) -> EvalResult<Value> {
        self(output, args)
    }
}
