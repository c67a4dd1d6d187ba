// src/dag/store.rs

//! Concurrency-safe task store.
//!
//! Holds every task of every expression, the dependents index used to find
//! newly-ready tasks, the FIFO ready queue handed out to pollers, and the
//! lease deadlines of in-progress tasks.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::dag::graph::TaskGraph;
use crate::dag::task_info::{DispatchedTask, Task};
use crate::errors::{CalcError, Result};
use crate::parser::{PlanOperand, TaskSpec};
use crate::types::{ExpressionId, Operand, TaskId, TaskOutcome, TaskStatus};

/// What changed when a result was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub task_id: TaskId,
    pub expression_id: ExpressionId,
    /// `Done` or `Error`.
    pub status: TaskStatus,
    /// Dependents whose last missing input just arrived.
    pub newly_ready: Vec<TaskId>,
}

#[derive(Debug, Default)]
struct StoreInner {
    tasks: HashMap<TaskId, Task>,
    /// task -> tasks that consume its result.
    dependents: HashMap<TaskId, Vec<TaskId>>,
    ready: VecDeque<TaskId>,
    /// in-progress task -> lease deadline.
    leases: HashMap<TaskId, Instant>,
    next_id: TaskId,
}

#[derive(Debug)]
pub struct TaskStore {
    inner: Mutex<StoreInner>,
    lease_timeout: Duration,
}

impl TaskStore {
    pub fn new(lease_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_id: 1,
                ..StoreInner::default()
            }),
            lease_timeout,
        }
    }

    /// Insert the whole graph of one expression atomically.
    ///
    /// Ids are assigned from the store-wide counter while the lock is held,
    /// so pollers never observe a partial graph. Leaf tasks go to the back
    /// of the ready queue in emission order.
    pub fn insert(&self, expression_id: ExpressionId, steps: &[TaskSpec]) -> Result<TaskGraph> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let first_id = inner.next_id;
        let graph = TaskGraph::from_steps(steps, first_id)?;

        let to_operand = |op: PlanOperand| match op {
            PlanOperand::Literal(v) => Operand::Literal(v),
            PlanOperand::Step(i) => Operand::Reference(first_id + i as TaskId),
        };

        for (index, spec) in steps.iter().enumerate() {
            let id = first_id + index as TaskId;
            let status = if spec.is_leaf() {
                TaskStatus::Ready
            } else {
                TaskStatus::Blocked
            };

            inner.tasks.insert(
                id,
                Task {
                    id,
                    expression_id,
                    operation: spec.operation,
                    arg1: to_operand(spec.arg1),
                    arg2: to_operand(spec.arg2),
                    operation_time: spec.operation_time,
                    status,
                    result: None,
                    error: None,
                },
            );
            inner.dependents.insert(id, graph.dependents_of(id));

            if status == TaskStatus::Ready {
                inner.ready.push_back(id);
            }
        }

        inner.next_id = first_id + steps.len() as TaskId;

        debug!(
            expression_id,
            first_id,
            root = graph.root(),
            tasks = steps.len(),
            "inserted task graph"
        );

        Ok(graph)
    }

    /// Hand out the oldest ready task, moving it to `InProgress` with a lease
    /// that expires at `now + lease_timeout`.
    pub fn next_ready(&self, now: Instant) -> Option<DispatchedTask> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        while let Some(id) = inner.ready.pop_front() {
            let Some(task) = inner.tasks.get(&id) else {
                warn!(task_id = id, "ready queue referenced unknown task; skipping");
                continue;
            };
            if task.status != TaskStatus::Ready {
                continue;
            }

            let (Some(arg1), Some(arg2)) = (
                resolve(&inner.tasks, task.arg1),
                resolve(&inner.tasks, task.arg2),
            ) else {
                warn!(task_id = id, "ready task has unresolved operands; skipping");
                continue;
            };

            let dispatched = DispatchedTask {
                id,
                arg1,
                arg2,
                operation: task.operation,
                operation_time: task.operation_time,
            };

            if let Some(task) = inner.tasks.get_mut(&id) {
                task.status = TaskStatus::InProgress;
            }
            inner.leases.insert(id, now + self.lease_timeout);

            return Some(dispatched);
        }

        None
    }

    /// Record a worker's outcome for an in-progress task.
    ///
    /// On success, returns the dependents that became ready. On failure no
    /// dependent is released; call [`TaskStore::fail_downstream`] to mark
    /// them as failed.
    pub fn record_result(&self, id: TaskId, outcome: TaskOutcome) -> Result<Resolution> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let task = inner.tasks.get_mut(&id).ok_or(CalcError::UnknownTask(id))?;
        if task.status != TaskStatus::InProgress {
            return Err(CalcError::TaskNotInProgress {
                id,
                status: task.status,
            });
        }

        let expression_id = task.expression_id;
        let status = match outcome {
            TaskOutcome::Value(value) => {
                task.status = TaskStatus::Done;
                task.result = Some(value);
                TaskStatus::Done
            }
            TaskOutcome::Failed(detail) => {
                task.status = TaskStatus::Error;
                task.error = Some(detail);
                TaskStatus::Error
            }
        };
        inner.leases.remove(&id);

        let mut newly_ready = Vec::new();
        if status == TaskStatus::Done {
            let dependents = inner.dependents.get(&id).cloned().unwrap_or_default();
            for dep_id in dependents {
                let satisfied = match inner.tasks.get(&dep_id) {
                    Some(dep) => {
                        dep.status == TaskStatus::Blocked
                            && dep.references().all(|r| {
                                inner
                                    .tasks
                                    .get(&r)
                                    .is_some_and(|t| t.status == TaskStatus::Done)
                            })
                    }
                    None => false,
                };

                if satisfied {
                    if let Some(dep) = inner.tasks.get_mut(&dep_id) {
                        dep.status = TaskStatus::Ready;
                    }
                    inner.ready.push_back(dep_id);
                    newly_ready.push(dep_id);
                }
            }
        }

        Ok(Resolution {
            task_id: id,
            expression_id,
            status,
            newly_ready,
        })
    }

    /// Mark every transitive dependent of `failed` that has not finished as
    /// `Error`, without ever scheduling it, then withdraw whatever else of
    /// the same expression is still waiting in the ready queue. Tasks that
    /// are already in progress are left to finish. Returns the ids that
    /// changed.
    pub fn fail_downstream(&self, failed: TaskId, detail: &str) -> Vec<TaskId> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let expression_id = inner.tasks.get(&failed).map(|t| t.expression_id);

        let mut stack: Vec<TaskId> = inner.dependents.get(&failed).cloned().unwrap_or_default();
        let mut visited: HashSet<TaskId> = HashSet::new();
        let mut newly_failed = Vec::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(task) = inner.tasks.get_mut(&id) else {
                continue;
            };

            match task.status {
                TaskStatus::Blocked | TaskStatus::Ready => {
                    task.status = TaskStatus::Error;
                    task.error = Some(format!("upstream task {failed} failed: {detail}"));
                    newly_failed.push(id);
                    if let Some(next) = inner.dependents.get(&id) {
                        stack.extend(next.iter().copied());
                    }
                }
                TaskStatus::InProgress | TaskStatus::Done | TaskStatus::Error => {}
            }
        }

        let queued: Vec<TaskId> = inner
            .ready
            .iter()
            .copied()
            .filter(|id| {
                inner.tasks.get(id).is_some_and(|t| {
                    Some(t.expression_id) == expression_id && t.status == TaskStatus::Ready
                })
            })
            .collect();
        for id in queued {
            if let Some(task) = inner.tasks.get_mut(&id) {
                task.status = TaskStatus::Error;
                task.error = Some(format!("withdrawn: task {failed} failed: {detail}"));
                newly_failed.push(id);
            }
        }

        if !newly_failed.is_empty() {
            debug!(task_id = failed, withdrawn = ?newly_failed, "failed downstream tasks");
            inner.ready.retain(|id| !newly_failed.contains(id));
        }

        newly_failed
    }

    /// Send every in-progress task whose lease expired at or before `now`
    /// back to the front of the ready queue.
    pub fn requeue_expired(&self, now: Instant) -> Vec<TaskId> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let mut expired: Vec<TaskId> = inner
            .leases
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        expired.sort_unstable();

        for id in &expired {
            inner.leases.remove(id);
            if let Some(task) = inner.tasks.get_mut(id) {
                if task.status == TaskStatus::InProgress {
                    task.status = TaskStatus::Ready;
                }
            }
        }
        // Oldest first at the front.
        for id in expired.iter().rev() {
            inner.ready.push_front(*id);
        }

        expired
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.inner.lock().tasks.get(&id).cloned()
    }

    /// Snapshot of all tasks, ordered by id.
    pub fn all(&self) -> Vec<Task> {
        let inner = self.inner.lock();
        let mut tasks: Vec<Task> = inner.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    /// Snapshot of the tasks owned by one expression, ordered by id.
    pub fn tasks_of(&self, expression_id: ExpressionId) -> Vec<Task> {
        let inner = self.inner.lock();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| t.expression_id == expression_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.id);
        tasks
    }

    pub fn ready_len(&self) -> usize {
        self.inner.lock().ready.len()
    }

    pub fn in_progress_len(&self) -> usize {
        self.inner.lock().leases.len()
    }
}

fn resolve(tasks: &HashMap<TaskId, Task>, operand: Operand) -> Option<f64> {
    match operand {
        Operand::Literal(v) => Some(v),
        Operand::Reference(id) => tasks.get(&id).and_then(|t| t.result),
    }
}
