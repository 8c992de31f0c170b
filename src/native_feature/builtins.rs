use std::io::Write;

use crate::eval::evaluator::EvalResult;
use crate::eval::value::Value;

pub const PRINT: &str = "print";

/// Writes the arguments space-joined, followed by a newline.
pub fn print(output: &mut dyn Write, args: &[Value]) -> EvalResult<Value> {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(output, "{}", line)?;
    output.flush()?;
    Ok(Value::Null)
}
