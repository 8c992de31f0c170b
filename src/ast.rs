use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::eval::evaluator::ErrorKind;
use crate::eval::value::Value;

/// Name given to a unit whose document has no `program` field.
pub const DEFAULT_PROGRAM_NAME: &str = "program";

/// Case key matched by `switch` when no other key does.
pub const SWITCH_WILDCARD: &str = "*";

/// Binding name for the actual list of a function declared without `args`.
pub const DEFAULT_VARIADIC_NAME: &str = "args";

/// Statement and expression keywords.
///
/// Operators are kept apart in [`Operator`]; a key is tried as an operator first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Keyword {
    Var,
    Local,
    Set,
    SetLocal,
    If,
    For,
    While,
    Switch,
    #[strum(to_string = "def", serialize = "function")]
    Def,
    Call,
    Return,
    Import,
    List,
    #[strum(to_string = "comment", serialize = "ignore")]
    Comment,
}

/// Binary operators folded left over an operand list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::Display)]
pub enum Operator {
    #[strum(to_string = "+", serialize = "add")]
    Add,
    #[strum(to_string = "-", serialize = "sub")]
    Sub,
    #[strum(to_string = "*", serialize = "mul")]
    Mul,
    #[strum(to_string = "/", serialize = "div")]
    Div,
    #[strum(to_string = "==", serialize = "eq")]
    Eq,
    #[strum(to_string = "!=", serialize = "ne")]
    Ne,
    #[strum(to_string = "<", serialize = "lt")]
    Lt,
    #[strum(to_string = ">", serialize = "gt")]
    Gt,
    #[strum(to_string = "&&", serialize = "and")]
    And,
    #[strum(to_string = "||", serialize = "or")]
    Or,
}

/// Formal parameters of a user-defined function.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Positional names; a call must pass exactly this many arguments.
    Fixed(Vec<String>),
    /// Every actual argument is bound as one list under this name.
    Variadic(String),
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Params::Fixed(names) => write!(f, "{}", names.join(" ")),
            Params::Variadic(name) => write!(f, "...{}", name),
        }
    }
}

/// One node of a program tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Untagged scalar; evaluates to itself.
    Literal(Value),
    /// List of nodes evaluated in order; yields the last value.
    Block(Vec<Node>),
    Var(String),
    Local {
        name: String,
        value: Option<Box<Node>>,
    },
    Set {
        name: String,
        value: Box<Node>,
    },
    SetLocal {
        name: String,
        value: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    For {
        init: Box<Node>,
        condition: Box<Node>,
        step: Box<Node>,
        code: Box<Node>,
    },
    While {
        condition: Box<Node>,
        code: Box<Node>,
    },
    Switch {
        value: Box<Node>,
        cases: HashMap<String, Node>,
    },
    Def {
        name: String,
        params: Params,
        code: Rc<Node>,
    },
    Call {
        name: String,
        args: Vec<Node>,
    },
    Return(Box<Node>),
    Import(Vec<String>),
    List(Vec<Node>),
    Operation {
        op: Operator,
        operands: Vec<Node>,
    },
    Comment,
}

impl Node {
    pub fn literal(value: impl Into<Value>) -> Self {
        Node::Literal(value.into())
    }
}

/// A loadable program unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub variables: BTreeMap<String, Value>,
    pub imports: Vec<String>,
    pub statements: Vec<Node>,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: BTreeMap::new(),
            imports: vec![],
            statements: vec![],
        }
    }
}

#[derive(Error, Debug)]
pub enum ASTError {
    #[error("\"{construct}\" {message}")]
    Shape { construct: String, message: String },
    #[error("Unrecognized command \"{0}\"")]
    UnknownConstruct(String),
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

impl ASTError {
    pub fn shape(construct: impl ToString, message: impl Into<String>) -> Self {
        ASTError::Shape {
            construct: construct.to_string(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ASTError::Shape { .. } | ASTError::Json(_) => ErrorKind::Shape,
            ASTError::UnknownConstruct(_) => ErrorKind::UnknownConstruct,
        }
    }
}

pub type ASTResult<T> = Result<T, ASTError>;
