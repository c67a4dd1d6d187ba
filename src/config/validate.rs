// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CalcError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = CalcError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_server(cfg)?;
    validate_agent(cfg)?;
    validate_lease(cfg)?;
    Ok(())
}

fn validate_server(cfg: &RawConfigFile) -> Result<()> {
    if cfg.server.listen.trim().is_empty() {
        return Err(CalcError::ConfigError(
            "[server].listen must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_agent(cfg: &RawConfigFile) -> Result<()> {
    if cfg.agent.computing_power == 0 {
        return Err(CalcError::ConfigError(
            "[agent].computing_power must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.agent.poll_interval_ms == 0 {
        return Err(CalcError::ConfigError(
            "[agent].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    let url = cfg.agent.orchestrator_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(CalcError::ConfigError(format!(
            "[agent].orchestrator_url must be an http(s) URL (got '{}')",
            url
        )));
    }
    Ok(())
}

fn validate_lease(cfg: &RawConfigFile) -> Result<()> {
    if cfg.lease.sweep_interval_ms == 0 {
        return Err(CalcError::ConfigError(
            "[lease].sweep_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    // A lease shorter than the slowest operation would expire on every task.
    let slowest = cfg.timings.max_ms();
    if cfg.lease.timeout_ms <= slowest {
        return Err(CalcError::ConfigError(format!(
            "[lease].timeout_ms ({}) must be greater than the slowest operation time ({} ms)",
            cfg.lease.timeout_ms, slowest
        )));
    }
    Ok(())
}
