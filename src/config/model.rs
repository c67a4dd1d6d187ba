// src/config/model.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Operation;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [server]
/// listen = "127.0.0.1:8080"
///
/// [timings]
/// addition_ms = 100
/// subtraction_ms = 100
/// multiplication_ms = 200
/// division_ms = 200
///
/// [agent]
/// computing_power = 4
/// poll_interval_ms = 100
/// orchestrator_url = "http://127.0.0.1:8080"
///
/// [lease]
/// timeout_ms = 30000
/// sweep_interval_ms = 1000
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub timings: Timings,

    #[serde(default)]
    pub agent: AgentSection,

    #[serde(default)]
    pub lease: LeaseSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub timings: Timings,
    pub agent: AgentSection,
    pub lease: LeaseSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            server: raw.server,
            timings: raw.timings,
            agent: raw.agent,
            lease: raw.lease,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSection {
    /// Socket address the orchestrator binds to.
    #[serde(default = "default_listen")]
    pub listen: String,
}

fn default_listen() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// `[timings]` section: simulated cost of each operation kind, in
/// milliseconds. Workers sleep this long before reporting a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Timings {
    #[serde(default = "default_operation_ms")]
    pub addition_ms: u64,

    #[serde(default = "default_operation_ms")]
    pub subtraction_ms: u64,

    #[serde(default = "default_operation_ms")]
    pub multiplication_ms: u64,

    #[serde(default = "default_operation_ms")]
    pub division_ms: u64,
}

fn default_operation_ms() -> u64 {
    100
}

impl Timings {
    /// Same cost for every operation. Handy in tests (`Timings::uniform(0)`).
    pub fn uniform(ms: u64) -> Self {
        Self {
            addition_ms: ms,
            subtraction_ms: ms,
            multiplication_ms: ms,
            division_ms: ms,
        }
    }

    pub fn for_operation(&self, op: Operation) -> u64 {
        match op {
            Operation::Add => self.addition_ms,
            Operation::Subtract => self.subtraction_ms,
            Operation::Multiply => self.multiplication_ms,
            Operation::Divide => self.division_ms,
        }
    }

    pub fn max_ms(&self) -> u64 {
        self.addition_ms
            .max(self.subtraction_ms)
            .max(self.multiplication_ms)
            .max(self.division_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::uniform(default_operation_ms())
    }
}

/// `[agent]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSection {
    /// Number of concurrent worker loops.
    #[serde(default = "default_computing_power")]
    pub computing_power: usize,

    /// How long a worker waits before polling again after an empty poll.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Base URL used by standalone agents (`distcalc agent`).
    #[serde(default = "default_orchestrator_url")]
    pub orchestrator_url: String,
}

fn default_computing_power() -> usize {
    4
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_orchestrator_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl AgentSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            computing_power: default_computing_power(),
            poll_interval_ms: default_poll_interval_ms(),
            orchestrator_url: default_orchestrator_url(),
        }
    }
}

/// `[lease]` section: how long a worker may hold a task before it is
/// handed to someone else.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LeaseSection {
    #[serde(default = "default_lease_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

fn default_lease_timeout_ms() -> u64 {
    30_000
}

fn default_sweep_interval_ms() -> u64 {
    1_000
}

impl LeaseSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for LeaseSection {
    fn default() -> Self {
        Self {
            timeout_ms: default_lease_timeout_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}
