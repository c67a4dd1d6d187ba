// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::types::{ExpressionId, TaskId, TaskStatus};

/// What went wrong while parsing an expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unclosed '('")]
    UnclosedParen,

    #[error("unmatched ')'")]
    UnmatchedParen,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("expression has more than {max} operations")]
    TooManyOperations { max: usize },

    #[error("parentheses nested deeper than {max}")]
    NestingTooDeep { max: usize },
}

/// Malformed expression, with the 0-based character offset of the problem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    pub position: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(position: usize, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }
}

/// Failure while computing a single operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),

    #[error("Invalid task graph: {0}")]
    InvalidGraph(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Expression not found: {0}")]
    UnknownExpression(ExpressionId),

    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Task {id} is not in progress (status: {status:?})")]
    TaskNotInProgress { id: TaskId, status: TaskStatus },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CalcError>;
