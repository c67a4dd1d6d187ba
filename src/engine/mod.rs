// src/engine/mod.rs

//! Orchestration runtime.
//!
//! Ties together the shared [`Scheduler`](crate::dag::Scheduler), the HTTP
//! server, the lease sweeper and the in-process agent pool. The scheduling
//! semantics live in [`crate::dag`]; this module only starts and stops the
//! async pieces around it.

pub mod runtime;
pub mod sweeper;

/// Runtime options that are not part of the config file.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Run workers inside the orchestrator process.
    pub run_agents: bool,
    /// Overrides `[agent].computing_power` for the in-process pool.
    pub computing_power: Option<usize>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            run_agents: true,
            computing_power: None,
        }
    }
}

pub use runtime::Orchestrator;
pub use sweeper::spawn_lease_sweeper;
