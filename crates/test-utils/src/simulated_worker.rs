use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use distcalc::agent::compute;
use distcalc::agent::source::{SourceFuture, TaskSource};
use distcalc::dag::{DispatchedTask, Scheduler};
use distcalc::types::{TaskId, TaskOutcome};

/// A synchronous stand-in for a pool of workers.
///
/// It polls the scheduler directly, computes each task with the real
/// arithmetic (skipping the simulated delay), and reports the outcome.
#[derive(Debug, Default)]
pub struct SimulatedWorker {
    /// Ids of the tasks this worker reported, in report order.
    pub executed: Vec<TaskId>,
}

impl SimulatedWorker {
    pub fn new() -> Self {
        Self::default()
    }

    fn outcome_of(task: &DispatchedTask) -> TaskOutcome {
        match compute(task.operation, task.arg1, task.arg2) {
            Ok(v) => TaskOutcome::Value(v),
            Err(e) => TaskOutcome::Failed(e.to_string()),
        }
    }

    /// Poll, compute, report one task at a time until nothing is ready.
    /// Returns the number of tasks executed.
    pub fn run_until_idle(&mut self, scheduler: &Scheduler) -> usize {
        let before = self.executed.len();
        while let Some(task) = scheduler.poll() {
            let outcome = Self::outcome_of(&task);
            scheduler
                .report(task.id, outcome)
                .expect("report for a freshly polled task must succeed");
            self.executed.push(task.id);
        }
        self.executed.len() - before
    }

    /// Drain every ready task first, let `order` permute the batch, then
    /// report the batch; repeat until nothing is ready. Models many workers
    /// finishing out of order.
    pub fn run_batched<F>(&mut self, scheduler: &Scheduler, mut order: F) -> usize
    where
        F: FnMut(&mut Vec<DispatchedTask>),
    {
        let before = self.executed.len();
        loop {
            let mut batch = Vec::new();
            while let Some(task) = scheduler.poll() {
                batch.push(task);
            }
            if batch.is_empty() {
                break;
            }
            order(&mut batch);
            for task in batch {
                let outcome = Self::outcome_of(&task);
                scheduler
                    .report(task.id, outcome)
                    .expect("report for a polled task must succeed");
                self.executed.push(task.id);
            }
        }
        self.executed.len() - before
    }
}

/// A `TaskSource` that hands out a fixed list of tasks and records every
/// reported outcome.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTaskSource {
    tasks: Arc<Mutex<VecDeque<DispatchedTask>>>,
    reported: Arc<Mutex<Vec<(TaskId, TaskOutcome)>>>,
}

impl ScriptedTaskSource {
    pub fn new(tasks: Vec<DispatchedTask>) -> Self {
        Self {
            tasks: Arc::new(Mutex::new(tasks.into())),
            reported: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reported(&self) -> Vec<(TaskId, TaskOutcome)> {
        self.reported.lock().unwrap().clone()
    }
}

impl TaskSource for ScriptedTaskSource {
    fn fetch_task(&self) -> SourceFuture<'_, Option<DispatchedTask>> {
        let task = self.tasks.lock().unwrap().pop_front();
        Box::pin(async move { Ok(task) })
    }

    fn submit_result(&self, id: TaskId, outcome: TaskOutcome) -> SourceFuture<'_, ()> {
        self.reported.lock().unwrap().push((id, outcome));
        Box::pin(async move { Ok(()) })
    }
}
