// src/types.rs

//! Shared vocabulary types: ids, operations, operands and lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a task. Unique across every expression in one store.
pub type TaskId = u64;

/// Identifier of a submitted expression.
pub type ExpressionId = u64;

/// One of the four binary operations a worker can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operation {
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Subtract => '-',
            Operation::Multiply => '*',
            Operation::Divide => '/',
        }
    }

    /// Binding strength used by the parser; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            Operation::Add | Operation::Subtract => 1,
            Operation::Multiply | Operation::Divide => 2,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A task operand: either a number known at build time or the result of
/// another task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Literal(f64),
    Reference(TaskId),
}

impl Operand {
    pub fn reference(&self) -> Option<TaskId> {
        match self {
            Operand::Literal(_) => None,
            Operand::Reference(id) => Some(*id),
        }
    }
}

/// Lifecycle of a single task.
///
/// `Blocked -> Ready -> InProgress -> {Done, Error}`; a blocked task can also
/// jump straight to `Error` when an upstream task fails, and an expired
/// lease sends `InProgress` back to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Blocked,
    Ready,
    InProgress,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }
}

/// Lifecycle of a submitted expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl ExpressionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExpressionStatus::Completed | ExpressionStatus::Error)
    }
}

impl fmt::Display for ExpressionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExpressionStatus::Pending => "pending",
            ExpressionStatus::Processing => "processing",
            ExpressionStatus::Completed => "completed",
            ExpressionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// What a worker reports back for a task it was handed.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Value(f64),
    Failed(String),
}
