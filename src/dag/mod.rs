// src/dag/mod.rs

//! Task graphs and scheduling.
//!
//! - [`graph`] holds the dependency graph of one expression.
//! - [`store`] owns every task's state, the ready queue and the leases.
//! - [`registry`] owns every expression's lifecycle.
//! - [`scheduler`] is the only component that mutates either of them.
//! - [`task_info`] provides the task types.
//! - [`scheduler_step`] defines the result types of scheduler operations.

pub mod graph;
pub mod registry;
pub mod scheduler;
pub mod scheduler_step;
pub mod store;
pub mod task_info;

pub use graph::TaskGraph;
pub use registry::{Expression, ExpressionRegistry};
pub use scheduler::Scheduler;
pub use scheduler_step::{ReportStep, Submission};
pub use store::{Resolution, TaskStore};
pub use task_info::{DispatchedTask, Task};
