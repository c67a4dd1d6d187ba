// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CalcError, Result};

/// Environment variables understood on top of the TOML file.
pub const ENV_TIME_ADDITION: &str = "TIME_ADDITION_MS";
pub const ENV_TIME_SUBTRACTION: &str = "TIME_SUBTRACTION_MS";
pub const ENV_TIME_MULTIPLICATION: &str = "TIME_MULTIPLICATIONS_MS";
pub const ENV_TIME_DIVISION: &str = "TIME_DIVISIONS_MS";
pub const ENV_COMPUTING_POWER: &str = "COMPUTING_POWER";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load, apply environment overrides, and validate.
///
/// A missing file is not an error: the defaults are used instead, so the
/// binary runs out of the box with only environment variables set.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let mut raw = if path.exists() {
        load_from_path(path)?
    } else {
        debug!(path = %path.display(), "config file not found; using defaults");
        RawConfigFile::default()
    };

    apply_env_overrides(&mut raw, |key| std::env::var(key).ok())?;
    ConfigFile::try_from(raw)
}

/// Override timing and agent settings from environment-style lookups.
///
/// `lookup` is injected so tests don't have to mutate the process
/// environment.
pub fn apply_env_overrides<F>(raw: &mut RawConfigFile, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let timings = &mut raw.timings;
    for (key, slot) in [
        (ENV_TIME_ADDITION, &mut timings.addition_ms),
        (ENV_TIME_SUBTRACTION, &mut timings.subtraction_ms),
        (ENV_TIME_MULTIPLICATION, &mut timings.multiplication_ms),
        (ENV_TIME_DIVISION, &mut timings.division_ms),
    ] {
        if let Some(value) = lookup(key) {
            *slot = parse_env_number(key, &value)?;
        }
    }

    if let Some(value) = lookup(ENV_COMPUTING_POWER) {
        raw.agent.computing_power = parse_env_number(ENV_COMPUTING_POWER, &value)?;
    }

    Ok(())
}

fn parse_env_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| {
        CalcError::ConfigError(format!(
            "environment variable {key} must be a non-negative integer (got '{value}')"
        ))
    })
}

/// Default config path: `Distcalc.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Distcalc.toml")
}
