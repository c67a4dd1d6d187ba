// src/dag/scheduler_step.rs

//! Result types for scheduler operations.

use crate::errors::ParseError;
use crate::types::{ExpressionId, ExpressionStatus, TaskId};

/// Outcome of submitting an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The expression was registered; its tasks (if any) are queued.
    Accepted(ExpressionId),
    /// The expression could not be parsed. It is recorded as `Error` under
    /// `id`, and no task was created.
    Rejected { id: ExpressionId, error: ParseError },
}

impl Submission {
    pub fn id(&self) -> ExpressionId {
        match self {
            Submission::Accepted(id) => *id,
            Submission::Rejected { id, .. } => *id,
        }
    }
}

/// Structured result of a single result report.
///
/// Useful for tests that want to step the graph manually and make
/// assertions about what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStep {
    pub task_id: TaskId,
    pub expression_id: ExpressionId,
    /// Tasks that became ready as a result of this report.
    pub newly_ready: Vec<TaskId>,
    /// Tasks newly marked as failed (excluding the reported task): its
    /// downstream tasks plus queued tasks of the same expression.
    pub newly_failed: Vec<TaskId>,
    /// Set if this report moved the owning expression to a terminal state.
    pub expression_finished: Option<ExpressionStatus>,
}
