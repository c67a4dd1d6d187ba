// src/agent/mod.rs

//! Worker side: poll for a task, compute it, report back.
//!
//! - [`compute`] performs one operation after its simulated delay.
//! - [`source`] provides the `TaskSource` trait and its in-process and
//!   HTTP implementations.
//! - [`worker`] owns the poll loop and the `AgentPool` that runs several.

pub mod compute;
pub mod source;
pub mod worker;

pub use compute::{compute, execute};
pub use source::{HttpTaskSource, LocalTaskSource, TaskSource};
pub use worker::{AgentPool, run_worker};
