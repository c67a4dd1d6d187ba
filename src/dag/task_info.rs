// src/dag/task_info.rs

//! Task state as held by the store, and the view handed to workers.

use serde::{Deserialize, Serialize};

use crate::types::{ExpressionId, Operand, Operation, TaskId, TaskStatus};

/// One binary operation node and its current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub expression_id: ExpressionId,
    pub operation: Operation,
    pub arg1: Operand,
    pub arg2: Operand,
    /// Simulated compute time in milliseconds.
    pub operation_time: u64,
    pub status: TaskStatus,
    /// Set once the task is `Done`.
    pub result: Option<f64>,
    /// Set once the task is `Error`.
    pub error: Option<String>,
}

impl Task {
    /// Task ids this task consumes results from.
    pub fn references(&self) -> impl Iterator<Item = TaskId> + '_ {
        [self.arg1, self.arg2]
            .into_iter()
            .filter_map(|op| op.reference())
    }
}

/// A task as handed to a worker: operands are resolved to plain numbers.
///
/// Field names match the `/internal/task` wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchedTask {
    pub id: TaskId,
    pub arg1: f64,
    pub arg2: f64,
    pub operation: Operation,
    pub operation_time: u64,
}
