use tracing::{debug, warn};

use super::context::ExecutionContext;
use super::evaluator::{EvalError, EvalResult, Evaluator};
use super::statement::StatementResult;
use super::value::Value;
use crate::ast::{ASTError, Node, Operator, Params};
use crate::function_registry::FunctionDef;

/// Remaining stack below which a call grows onto a new segment.
const RED_ZONE: usize = 100 * 1024;
/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

impl Evaluator {
    pub(super) fn eval_list(
        &self,
        items: &[Node],
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let mut list = Vec::with_capacity(items.len());
        for item in items {
            list.push(value_or_return!(self.eval_node(item, context)?));
        }
        Ok(StatementResult::Value(Value::List(list)))
    }

    /// Evaluates every operand in order, then folds left with `op`.
    /// `&&` and `||` do not short-circuit.
    pub(super) fn eval_operation(
        &self,
        op: Operator,
        operands: &[Node],
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let mut values = Vec::with_capacity(operands.len());
        for operand in operands {
            values.push(value_or_return!(self.eval_node(operand, context)?));
        }
        let mut values = values.into_iter();
        let first = values
            .next()
            .ok_or_else(|| ASTError::shape(op, "expects at least one operand"))?;
        values
            .try_fold(first, |acc, value| apply_operator(op, acc, value))
            .map(StatementResult::Value)
    }

    pub(super) fn eval_call(
        &self,
        name: &str,
        args: &[Node],
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(value_or_return!(self.eval_node(arg, context)?));
        }
        self.invoke(name, values, context)
            .map(StatementResult::Value)
    }

    /// Call protocol.
    ///
    /// Natives receive the argument list directly. A user function gets a new
    /// chain-root frame holding its parameters; a `return` anywhere in the body
    /// ends the call with its value, otherwise the body's last value is the result.
    /// The frame is popped whether the body succeeds, returns, or fails.
    /// Nesting deeper than the context's call limit is a runtime error.
    pub fn invoke(
        &self,
        name: &str,
        args: Vec<Value>,
        context: &mut ExecutionContext,
    ) -> EvalResult<Value> {
        let function = context
            .functions
            .get(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;
        debug!(function = name, args = args.len(), "invoke");

        match function {
            FunctionDef::Native(native) => native.call(context.output(), &args),
            FunctionDef::User { params, body } => {
                let bindings = bind_arguments(name, &params, args)?;
                if let Err(err) = context.enter_call() {
                    warn!(function = name, "{err}");
                    return Err(err);
                }
                context.scopes.push_call_scope();
                for (param, value) in bindings {
                    context.scopes.declare(&param, value);
                }
                let result = stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, || {
                    self.eval_node(&body, context)
                });
                context.exit_call();
                context.exit_scope()?;
                result.map(StatementResult::into_value)
            }
        }
    }
}

/// Pairs formals with actuals. Fails before anything is bound on arity mismatch.
fn bind_arguments(
    function: &str,
    params: &Params,
    args: Vec<Value>,
) -> EvalResult<Vec<(String, Value)>> {
    match params {
        Params::Fixed(names) if names.len() == args.len() => {
            Ok(names.iter().cloned().zip(args).collect())
        }
        Params::Fixed(names) => Err(EvalError::ArityMismatch {
            function: function.to_string(),
            expected: names.len(),
            actual: args.len(),
        }),
        Params::Variadic(name) => Ok(vec![(name.clone(), Value::List(args))]),
    }
}

pub fn apply_operator(op: Operator, left: Value, right: Value) -> EvalResult<Value> {
    let mismatch = |left: &Value, right: &Value| EvalError::TypeMismatch {
        operator: op,
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        Operator::Add => match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Ok(Value::List(a))
            }
            (left, right) => Err(mismatch(&left, &right)),
        },
        Operator::Sub | Operator::Mul | Operator::Div => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(match op {
                Operator::Sub => a - b,
                Operator::Mul => a * b,
                _ => a / b,
            })),
            _ => Err(mismatch(&left, &right)),
        },
        Operator::Eq => Ok(Value::Boolean(left.loose_eq(&right))),
        Operator::Ne => Ok(Value::Boolean(!left.loose_eq(&right))),
        Operator::Lt | Operator::Gt => {
            let ordering = left.compare(&right).ok_or_else(|| mismatch(&left, &right))?;
            Ok(Value::Boolean(if op == Operator::Lt {
                ordering.is_lt()
            } else {
                ordering.is_gt()
            }))
        }
        Operator::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        Operator::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
    }
}
