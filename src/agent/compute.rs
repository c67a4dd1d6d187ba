// src/agent/compute.rs

//! The actual arithmetic a worker performs.

use std::time::Duration;

use crate::dag::DispatchedTask;
use crate::errors::ArithmeticError;
use crate::types::{Operation, TaskOutcome};

pub fn compute(operation: Operation, a: f64, b: f64) -> Result<f64, ArithmeticError> {
    let value = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => {
            if b == 0.0 {
                return Err(ArithmeticError::DivisionByZero);
            }
            a / b
        }
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(ArithmeticError::NonFinite)
    }
}

/// Wait out the task's simulated cost, then compute it.
pub async fn execute(task: &DispatchedTask) -> TaskOutcome {
    if task.operation_time > 0 {
        tokio::time::sleep(Duration::from_millis(task.operation_time)).await;
    }

    match compute(task.operation, task.arg1, task.arg2) {
        Ok(value) => TaskOutcome::Value(value),
        Err(err) => TaskOutcome::Failed(err.to_string()),
    }
}
