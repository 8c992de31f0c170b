use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, instrument};

use super::context::ExecutionContext;
use super::evaluator::{EvalError, EvalResult, Evaluator};
use super::value::Value;
use crate::ast::{Node, Params, SWITCH_WILDCARD};
use crate::function_registry::FunctionDef;
use crate::parser::parse_program;

/// Outcome of evaluating a node.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    /// Ordinary value (Null for pure side effects).
    Value(Value),
    /// A `return` unwinding toward the nearest function call.
    Return(Value),
}

impl StatementResult {
    pub fn into_value(self) -> Value {
        match self {
            StatementResult::Value(value) | StatementResult::Return(value) => value,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, StatementResult::Return(_))
    }
}

impl Evaluator {
    pub fn eval_block(
        &self,
        statements: &[Node],
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let mut last = Value::Null;
        for statement in statements {
            last = value_or_return!(self.eval_node(statement, context)?);
        }
        Ok(StatementResult::Value(last))
    }

    /// Runs `body` in a fresh frame; the frame is popped on every exit path.
    fn scoped<F>(&self, context: &mut ExecutionContext, body: F) -> EvalResult<StatementResult>
    where
        F: FnOnce(&mut ExecutionContext) -> EvalResult<StatementResult>,
    {
        context.enter_scope();
        let result = body(context);
        context.exit_scope()?;
        result
    }

    pub(super) fn eval_local(
        &self,
        name: &str,
        value: Option<&Node>,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        if let Some(value) = value {
            let value = value_or_return!(self.eval_node(value, context)?);
            context.set_local(name, value);
        }
        context.get_local(name).map(StatementResult::Value)
    }

    pub(super) fn eval_set(
        &self,
        name: &str,
        value: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let value = value_or_return!(self.eval_node(value, context)?);
        context.set_global(name, value.clone());
        Ok(StatementResult::Value(value))
    }

    pub(super) fn eval_set_local(
        &self,
        name: &str,
        value: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let value = value_or_return!(self.eval_node(value, context)?);
        context.set_local(name, value.clone());
        Ok(StatementResult::Value(value))
    }

    pub(super) fn eval_if(
        &self,
        condition: &Node,
        then_branch: &Node,
        else_branch: Option<&Node>,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        self.scoped(context, |context| {
            let condition = value_or_return!(self.eval_node(condition, context)?);
            if condition.is_truthy() {
                self.eval_node(then_branch, context)
            } else if let Some(else_branch) = else_branch {
                self.eval_node(else_branch, context)
            } else {
                Ok(StatementResult::Value(Value::Null))
            }
        })
    }

    pub(super) fn eval_for(
        &self,
        init: &Node,
        condition: &Node,
        step: &Node,
        code: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        self.scoped(context, |context| {
            value_or_return!(self.eval_node(init, context)?);
            while value_or_return!(self.eval_node(condition, context)?).is_truthy() {
                value_or_return!(self.eval_node(code, context)?);
                value_or_return!(self.eval_node(step, context)?);
            }
            Ok(StatementResult::Value(Value::Null))
        })
    }

    pub(super) fn eval_while(
        &self,
        condition: &Node,
        code: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        self.scoped(context, |context| {
            while value_or_return!(self.eval_node(condition, context)?).is_truthy() {
                value_or_return!(self.eval_node(code, context)?);
            }
            Ok(StatementResult::Value(Value::Null))
        })
    }

    pub(super) fn eval_switch(
        &self,
        value: &Node,
        cases: &HashMap<String, Node>,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        self.scoped(context, |context| {
            let key = value_or_return!(self.eval_node(value, context)?).to_string();
            match cases.get(&key).or_else(|| cases.get(SWITCH_WILDCARD)) {
                Some(block) => self.eval_node(block, context),
                None => Ok(StatementResult::Value(Value::Null)),
            }
        })
    }

    pub(super) fn eval_def(
        &self,
        name: &str,
        params: &Params,
        code: &Rc<Node>,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        debug!(function = name, params = %params, "define function");
        context.functions.define(
            name,
            FunctionDef::User {
                params: params.clone(),
                body: Rc::clone(code),
            },
        );
        Ok(StatementResult::Value(Value::Function(name.to_string())))
    }

    pub(super) fn eval_return(
        &self,
        value: &Node,
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let value = value_or_return!(self.eval_node(value, context)?);
        Ok(StatementResult::Return(value))
    }

    pub(super) fn eval_import(
        &self,
        references: &[String],
        context: &mut ExecutionContext,
    ) -> EvalResult<StatementResult> {
        let mut last = Value::Null;
        for reference in references {
            last = self.import_program(reference, context)?;
        }
        Ok(StatementResult::Value(last))
    }

    /// Loads a unit through the host loader, registers it and runs it.
    ///
    /// There is no caching and no cycle detection: importing the same unit twice
    /// runs it twice, and a unit importing itself recurses until the stack runs out.
    #[instrument(level = "debug", skip(self, context))]
    pub fn import_program(
        &self,
        reference: &str,
        context: &mut ExecutionContext,
    ) -> EvalResult<Value> {
        let text = context.load_unit_text(reference)?;
        let program = parse_program(&text).map_err(|source| EvalError::InvalidUnit {
            reference: reference.to_string(),
            source,
        })?;
        let name = program.name.clone();
        context.programs.register(program);
        self.run_program(&name, context)
    }

    /// Merges the unit's variables into globals, runs its imports in order, then
    /// its statements. A top-level `return` ends the unit with that value.
    #[instrument(level = "debug", skip(self, context))]
    pub fn run_program(&self, name: &str, context: &mut ExecutionContext) -> EvalResult<Value> {
        let program = context
            .programs
            .get(name)
            .ok_or_else(|| EvalError::ProgramNotFound(name.to_string()))?;

        context.globals.extend(
            program
                .variables
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        for reference in &program.imports {
            self.import_program(reference, context)?;
        }
        self.eval_block(&program.statements, context)
            .map(StatementResult::into_value)
    }
}
