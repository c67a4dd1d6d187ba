// src/logging.rs

//! Logging setup for `distcalc` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` on the command line
//! 2. `DISTCALC_LOG`: either a bare level (`debug`) or a full directive
//!    such as `distcalc::dag=trace,axum=debug`
//! 3. [`DEFAULT_DIRECTIVE`]
//!
//! Everything goes to stderr; `distcalc check` prints the config on stdout.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "DISTCALC_LOG";

/// Our own events at `info`, the HTTP stack only when it has something to
/// complain about.
pub const DEFAULT_DIRECTIVE: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn";

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => with_quiet_deps(Level::from(lvl)),
        None => std::env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|raw| filter_from_env(&raw))
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE)),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

fn with_quiet_deps(level: Level) -> EnvFilter {
    EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn"))
}

fn filter_from_env(raw: &str) -> Option<EnvFilter> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("warning") {
        return Some(with_quiet_deps(Level::WARN));
    }
    match raw.parse::<Level>() {
        Ok(level) => Some(with_quiet_deps(level)),
        Err(_) => EnvFilter::try_new(raw).ok(),
    }
}
