// src/dag/scheduler.rs

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{ConfigFile, Timings};
use crate::dag::registry::{Expression, ExpressionRegistry};
use crate::dag::scheduler_step::{ReportStep, Submission};
use crate::dag::store::TaskStore;
use crate::dag::task_info::{DispatchedTask, Task};
use crate::errors::{ArithmeticError, CalcError, Result};
use crate::parser::{Plan, build_plan};
use crate::types::{ExpressionId, ExpressionStatus, TaskId, TaskOutcome, TaskStatus};

/// Glue between the task store and the expression registry.
///
/// It is responsible for:
/// - turning submitted text into a task graph
/// - handing ready tasks to polling workers
/// - recording results and releasing dependents
/// - failing everything downstream of a failed task
/// - finishing the owning expression when its root resolves
/// - requeueing tasks whose lease expired
///
/// Every update touching both stores commits the task transition first and
/// the expression transition second.
#[derive(Debug)]
pub struct Scheduler {
    tasks: TaskStore,
    expressions: ExpressionRegistry,
    /// expression -> root task.
    roots: Mutex<HashMap<ExpressionId, TaskId>>,
    timings: Timings,
}

impl Scheduler {
    pub fn new(tasks: TaskStore, expressions: ExpressionRegistry, timings: Timings) -> Self {
        Self {
            tasks,
            expressions,
            roots: Mutex::new(HashMap::new()),
            timings,
        }
    }

    /// Construct a scheduler with empty stores from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(
            TaskStore::new(cfg.lease.timeout()),
            ExpressionRegistry::new(),
            cfg.timings,
        )
    }

    /// Parse `raw`, register it, and queue its tasks.
    ///
    /// Returns immediately; computation happens as workers poll. A parse
    /// failure is not an `Err`: the expression is recorded as `Error` and
    /// reported as [`Submission::Rejected`].
    pub fn submit(&self, raw: &str) -> Result<Submission> {
        let steps = match build_plan(raw, &self.timings) {
            Err(error) => {
                let id = self.expressions.create_failed(raw, error.to_string());
                warn!(expression_id = id, %error, "rejected malformed expression");
                return Ok(Submission::Rejected { id, error });
            }
            Ok(Plan::Literal(value)) => {
                let id = self.expressions.create_completed(raw, value);
                info!(expression_id = id, value, "expression has no operations; completed");
                return Ok(Submission::Accepted(id));
            }
            Ok(Plan::Graph(steps)) => steps,
        };

        let id = self.expressions.create(raw);

        // Hold the roots lock across the insert so a fast worker cannot
        // report the root before we know it is the root.
        let mut roots = self.roots.lock();
        match self.tasks.insert(id, &steps) {
            Ok(graph) => {
                roots.insert(id, graph.root());
                info!(
                    expression_id = id,
                    tasks = steps.len(),
                    root = graph.root(),
                    "expression accepted"
                );
                Ok(Submission::Accepted(id))
            }
            Err(err) => {
                drop(roots);
                self.expressions.mark_error(id, err.to_string());
                Err(err)
            }
        }
    }

    /// Hand out one ready task, or `None` if nothing is ready right now.
    pub fn poll(&self) -> Option<DispatchedTask> {
        self.poll_at(Instant::now())
    }

    /// [`Scheduler::poll`] with an explicit clock, for lease tests.
    pub fn poll_at(&self, now: Instant) -> Option<DispatchedTask> {
        let task = self.tasks.next_ready(now)?;
        debug!(
            task_id = task.id,
            operation = %task.operation,
            arg1 = task.arg1,
            arg2 = task.arg2,
            "dispatching task"
        );
        Some(task)
    }

    /// Record a worker's outcome for task `id` (production API).
    pub fn report(&self, id: TaskId, outcome: TaskOutcome) -> Result<()> {
        self.step_report(id, outcome).map(|_| ())
    }

    /// Variant of [`Scheduler::report`] that returns a rich [`ReportStep`].
    pub fn step_report(&self, id: TaskId, outcome: TaskOutcome) -> Result<ReportStep> {
        let outcome = match outcome {
            TaskOutcome::Value(v) if !v.is_finite() => {
                TaskOutcome::Failed(ArithmeticError::NonFinite.to_string())
            }
            other => other,
        };

        let resolution = self.tasks.record_result(id, outcome.clone())?;
        let expression_id = resolution.expression_id;

        let mut step = ReportStep {
            task_id: id,
            expression_id,
            newly_ready: resolution.newly_ready,
            newly_failed: Vec::new(),
            expression_finished: None,
        };

        match (resolution.status, outcome) {
            (TaskStatus::Done, TaskOutcome::Value(value)) => {
                debug!(
                    task_id = id,
                    expression_id,
                    value,
                    newly_ready = ?step.newly_ready,
                    "task done"
                );
                if self.root_of(expression_id) == Some(id)
                    && self.expressions.mark_completed(expression_id, value)
                {
                    step.expression_finished = Some(ExpressionStatus::Completed);
                }
            }
            (_, TaskOutcome::Failed(detail)) => {
                warn!(
                    task_id = id,
                    expression_id,
                    error = %detail,
                    "task failed; failing dependents"
                );
                step.newly_failed = self.tasks.fail_downstream(id, &detail);
                if self.expressions.mark_error(expression_id, detail) {
                    step.expression_finished = Some(ExpressionStatus::Error);
                }
            }
            (status, outcome) => {
                warn!(task_id = id, ?status, ?outcome, "unexpected resolution");
            }
        }

        Ok(step)
    }

    /// Requeue every in-progress task whose lease has expired.
    pub fn sweep_leases(&self) -> Vec<TaskId> {
        self.sweep_leases_at(Instant::now())
    }

    /// [`Scheduler::sweep_leases`] with an explicit clock.
    pub fn sweep_leases_at(&self, now: Instant) -> Vec<TaskId> {
        let requeued = self.tasks.requeue_expired(now);
        if !requeued.is_empty() {
            warn!(?requeued, "lease expired; tasks requeued");
        }
        requeued
    }

    /// Root task of an expression, if it has one.
    pub fn root_of(&self, expression_id: ExpressionId) -> Option<TaskId> {
        self.roots.lock().get(&expression_id).copied()
    }

    pub fn expression(&self, id: ExpressionId) -> Result<Expression> {
        self.expressions
            .get(id)
            .ok_or(CalcError::UnknownExpression(id))
    }

    pub fn expressions(&self) -> Vec<Expression> {
        self.expressions.list()
    }

    pub fn task(&self, id: TaskId) -> Result<Task> {
        self.tasks.get(id).ok_or(CalcError::UnknownTask(id))
    }

    pub fn tasks_of(&self, expression_id: ExpressionId) -> Vec<Task> {
        self.tasks.tasks_of(expression_id)
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }
}
