use thiserror::Error;

use crate::ast::ASTError;
use crate::eval::evaluator::{ErrorKind, EvalError};
use crate::loader::LoadError;

#[derive(Error, Debug)]
pub enum JsonLangError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    AST(#[from] ASTError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{0}")]
    Config(String),
    // shell command misuse
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Internal(String),
}

pub type InternalResult<T> = Result<T, JsonLangError>;

impl JsonLangError {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        JsonLangError::Internal(message.into())
    }

    pub fn usage<S: Into<String>>(message: S) -> Self {
        JsonLangError::Usage(message.into())
    }

    /// Category name shown to the user.
    pub fn kind(&self) -> String {
        match self {
            JsonLangError::Eval(e) => e.kind().to_string(),
            JsonLangError::AST(e) => e.kind().to_string(),
            JsonLangError::Load(_) => ErrorKind::Lookup.to_string(),
            JsonLangError::Config(_) => "ConfigError".to_string(),
            JsonLangError::Usage(_) => "UsageError".to_string(),
            JsonLangError::Io(_) => "IOError".to_string(),
            JsonLangError::Internal(_) => ErrorKind::Runtime.to_string(),
        }
    }

    /// `ERROR: <Kind>: <message>`
    pub fn report(&self) -> String {
        format!("ERROR: {}: {}", self.kind(), self)
    }
}
