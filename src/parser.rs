//! Conversion of JSON documents into program trees.
//!
//! Every node is validated while it is built: a document either becomes a
//! well-formed [`Node`] tree or the load fails with an [`ASTError`].

use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::{Map, Value as JsonValue};
use tracing::instrument;

use crate::ast::*;
use crate::eval::value::Value;

type JsonObject = Map<String, JsonValue>;

/// Parses program text (`{"program", "variables", "import", "code"}`).
#[instrument(level = "debug", skip(input))]
pub fn parse_program(input: &str) -> ASTResult<Program> {
    let document: JsonValue = serde_json::from_str(input)?;
    parse_program_document(&document)
}

pub fn parse_program_document(document: &JsonValue) -> ASTResult<Program> {
    let fields = document
        .as_object()
        .ok_or_else(|| ASTError::shape("program", "expects an object"))?;

    let name = match fields.get("program") {
        None => DEFAULT_PROGRAM_NAME.to_string(),
        Some(JsonValue::String(name)) => name.clone(),
        Some(_) => return Err(ASTError::shape("program", "name must be a string")),
    };

    let variables = match fields.get("variables") {
        None => Default::default(),
        Some(JsonValue::Object(entries)) => entries
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value)))
            .collect(),
        Some(_) => return Err(ASTError::shape("variables", "expects an object")),
    };

    let imports = match fields.get("import") {
        None => vec![],
        Some(payload) => parse_import_refs(payload)?,
    };

    let statements = match fields.get("code") {
        None => vec![],
        Some(JsonValue::Array(items)) => parse_nodes(items)?,
        Some(single) => vec![parse_node(single)?],
    };

    Ok(Program {
        name,
        variables,
        imports,
        statements,
    })
}

/// Parses one statement, as typed at the shell.
pub fn parse_statement(input: &str) -> ASTResult<Node> {
    let value: JsonValue = serde_json::from_str(input)?;
    parse_node(&value)
}

pub fn parse_node(value: &JsonValue) -> ASTResult<Node> {
    match value {
        JsonValue::Array(items) => Ok(Node::Block(parse_nodes(items)?)),
        JsonValue::Object(entries) => parse_keyword_node(entries),
        scalar => Ok(Node::Literal(Value::from(scalar))),
    }
}

fn parse_nodes(items: &[JsonValue]) -> ASTResult<Vec<Node>> {
    items.iter().map(parse_node).collect()
}

fn boxed(value: &JsonValue) -> ASTResult<Box<Node>> {
    parse_node(value).map(Box::new)
}

fn parse_keyword_node(entries: &JsonObject) -> ASTResult<Node> {
    let mut iter = entries.iter();
    let (key, payload) = match (iter.next(), iter.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(ASTError::shape(
                "node",
                format!("expects exactly one keyword, found {}", entries.len()),
            ))
        }
    };

    if let Ok(op) = Operator::from_str(key) {
        return parse_operation(op, payload);
    }

    let keyword =
        Keyword::from_str(key).map_err(|_| ASTError::UnknownConstruct(key.to_string()))?;

    match keyword {
        Keyword::Var => parse_var(payload),
        Keyword::Local => parse_local(payload),
        Keyword::Set => {
            let fields = Fields::object(keyword, payload)?;
            Ok(Node::Set {
                name: fields.name()?,
                value: boxed(fields.required("value")?)?,
            })
        }
        Keyword::SetLocal => {
            let fields = Fields::object(keyword, payload)?;
            Ok(Node::SetLocal {
                name: fields.name()?,
                value: boxed(fields.required("value")?)?,
            })
        }
        Keyword::If => {
            let fields = Fields::object(keyword, payload)?;
            Ok(Node::If {
                condition: boxed(fields.required("condition")?)?,
                then_branch: boxed(fields.required("then")?)?,
                else_branch: fields.optional("else").map(boxed).transpose()?,
            })
        }
        Keyword::For => parse_for(payload),
        Keyword::While => {
            let fields = Fields::object(keyword, payload)?;
            Ok(Node::While {
                condition: boxed(fields.required("condition")?)?,
                code: boxed(fields.required("code")?)?,
            })
        }
        Keyword::Switch => parse_switch(payload),
        Keyword::Def => parse_def(payload),
        Keyword::Call => parse_call(payload),
        Keyword::Return => Ok(Node::Return(boxed(payload)?)),
        Keyword::Import => Ok(Node::Import(parse_import_refs(payload)?)),
        Keyword::List => match payload {
            JsonValue::Array(items) => Ok(Node::List(parse_nodes(items)?)),
            _ => Err(ASTError::shape(keyword, "expects a list")),
        },
        Keyword::Comment => Ok(Node::Comment),
    }
}

/// Named-field access on an object payload, reporting errors against the keyword.
struct Fields<'a> {
    keyword: Keyword,
    entries: &'a JsonObject,
}

impl<'a> Fields<'a> {
    fn object(keyword: Keyword, payload: &'a JsonValue) -> ASTResult<Self> {
        payload
            .as_object()
            .map(|entries| Self { keyword, entries })
            .ok_or_else(|| ASTError::shape(keyword, "expects an object"))
    }

    fn required(&self, field: &str) -> ASTResult<&'a JsonValue> {
        self.entries
            .get(field)
            .ok_or_else(|| ASTError::shape(self.keyword, format!("is missing field \"{field}\"")))
    }

    fn optional(&self, field: &str) -> Option<&'a JsonValue> {
        self.entries.get(field)
    }

    fn name(&self) -> ASTResult<String> {
        match self.required("name")? {
            JsonValue::String(name) => Ok(name.clone()),
            _ => Err(ASTError::shape(self.keyword, "field \"name\" must be a string")),
        }
    }
}

fn parse_var(payload: &JsonValue) -> ASTResult<Node> {
    match payload {
        JsonValue::String(name) => Ok(Node::Var(name.clone())),
        JsonValue::Object(_) => Ok(Node::Var(Fields::object(Keyword::Var, payload)?.name()?)),
        _ => Err(ASTError::shape(Keyword::Var, "expects an object or a string")),
    }
}

fn parse_local(payload: &JsonValue) -> ASTResult<Node> {
    match payload {
        JsonValue::String(name) => Ok(Node::Local {
            name: name.clone(),
            value: None,
        }),
        JsonValue::Object(_) => {
            let fields = Fields::object(Keyword::Local, payload)?;
            Ok(Node::Local {
                name: fields.name()?,
                value: fields.optional("value").map(boxed).transpose()?,
            })
        }
        _ => Err(ASTError::shape(Keyword::Local, "expects an object or a string")),
    }
}

fn parse_for(payload: &JsonValue) -> ASTResult<Node> {
    let fields = Fields::object(Keyword::For, payload)?;
    let range = match fields.required("range")? {
        JsonValue::Array(items) if items.len() == 3 => items,
        _ => {
            return Err(ASTError::shape(
                Keyword::For,
                "field \"range\" must be a list of [init, condition, step]",
            ))
        }
    };
    Ok(Node::For {
        init: boxed(&range[0])?,
        condition: boxed(&range[1])?,
        step: boxed(&range[2])?,
        code: boxed(fields.required("code")?)?,
    })
}

fn parse_switch(payload: &JsonValue) -> ASTResult<Node> {
    let fields = Fields::object(Keyword::Switch, payload)?;
    let cases = match fields.required("case")? {
        JsonValue::Object(cases) => cases
            .iter()
            .map(|(key, block)| Ok((key.clone(), parse_node(block)?)))
            .collect::<ASTResult<HashMap<_, _>>>()?,
        _ => return Err(ASTError::shape(Keyword::Switch, "field \"case\" must be an object")),
    };
    Ok(Node::Switch {
        value: boxed(fields.required("value")?)?,
        cases,
    })
}

fn parse_def(payload: &JsonValue) -> ASTResult<Node> {
    let fields = Fields::object(Keyword::Def, payload)?;
    let params = match fields.optional("args") {
        None => Params::Variadic(DEFAULT_VARIADIC_NAME.to_string()),
        Some(JsonValue::String(name)) => Params::Variadic(name.clone()),
        Some(JsonValue::Array(names)) => Params::Fixed(
            names
                .iter()
                .map(|name| {
                    name.as_str().map(str::to_string).ok_or_else(|| {
                        ASTError::shape(Keyword::Def, "argument names must be strings")
                    })
                })
                .collect::<ASTResult<_>>()?,
        ),
        Some(_) => {
            return Err(ASTError::shape(
                Keyword::Def,
                "field \"args\" must be a list of names or a string",
            ))
        }
    };
    Ok(Node::Def {
        name: fields.name()?,
        params,
        code: Rc::new(parse_node(fields.required("code")?)?),
    })
}

fn parse_call(payload: &JsonValue) -> ASTResult<Node> {
    match payload {
        JsonValue::String(name) => Ok(Node::Call {
            name: name.clone(),
            args: vec![],
        }),
        JsonValue::Object(_) => {
            let fields = Fields::object(Keyword::Call, payload)?;
            let args = match fields.optional("args") {
                None => vec![],
                Some(JsonValue::Array(items)) => parse_nodes(items)?,
                Some(single) => vec![parse_node(single)?],
            };
            Ok(Node::Call {
                name: fields.name()?,
                args,
            })
        }
        _ => Err(ASTError::shape(Keyword::Call, "expects an object or a string")),
    }
}

fn parse_import_refs(payload: &JsonValue) -> ASTResult<Vec<String>> {
    match payload {
        JsonValue::String(reference) => Ok(vec![reference.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ASTError::shape(Keyword::Import, "references must be strings")
                })
            })
            .collect(),
        _ => Err(ASTError::shape(Keyword::Import, "expects a list or a string")),
    }
}

fn parse_operation(op: Operator, payload: &JsonValue) -> ASTResult<Node> {
    match payload {
        JsonValue::Array(items) if !items.is_empty() => Ok(Node::Operation {
            op,
            operands: parse_nodes(items)?,
        }),
        JsonValue::Array(_) => Err(ASTError::shape(op, "expects at least one operand")),
        _ => Err(ASTError::shape(op, "expects a list")),
    }
}
