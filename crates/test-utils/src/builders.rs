#![allow(dead_code)]

use distcalc::config::{ConfigFile, RawConfigFile, Timings};
use distcalc::dag::{ExpressionRegistry, Scheduler, TaskStore};

/// Builder for `ConfigFile` to simplify test setup.
///
/// Starts from fast settings: zero-cost operations, a short poll interval,
/// and a listener on an ephemeral port.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.server.listen = "127.0.0.1:0".to_string();
        config.timings = Timings::uniform(0);
        config.agent.poll_interval_ms = 5;
        config.agent.computing_power = 2;
        config.lease.sweep_interval_ms = 50;
        Self { config }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.config.timings = timings;
        self
    }

    pub fn with_uniform_timing(mut self, ms: u64) -> Self {
        self.config.timings = Timings::uniform(ms);
        self
    }

    pub fn with_computing_power(mut self, n: usize) -> Self {
        self.config.agent.computing_power = n;
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.agent.poll_interval_ms = ms;
        self
    }

    pub fn with_lease(mut self, timeout_ms: u64, sweep_interval_ms: u64) -> Self {
        self.config.lease.timeout_ms = timeout_ms;
        self.config.lease.sweep_interval_ms = sweep_interval_ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scheduler with empty stores, zero-cost timings and the given lease.
pub fn scheduler_with_lease(lease: std::time::Duration) -> Scheduler {
    Scheduler::new(
        TaskStore::new(lease),
        ExpressionRegistry::new(),
        Timings::uniform(0),
    )
}

/// Scheduler with empty stores, zero-cost timings and a long lease.
pub fn scheduler() -> Scheduler {
    scheduler_with_lease(std::time::Duration::from_secs(60))
}
