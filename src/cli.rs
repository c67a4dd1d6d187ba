// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `distcalc`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "distcalc",
    version,
    about = "Evaluate arithmetic expressions by distributing their operations to polling workers.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Distcalc.toml` in the current working directory. A missing
    /// file means "use defaults".
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path(), global = true)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DISTCALC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the orchestrator (HTTP API) with an in-process agent pool.
    Serve(ServeArgs),
    /// Run only an agent pool against a remote orchestrator.
    Agent(AgentArgs),
    /// Load + validate config, print it, and exit.
    Check,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on; overrides `[server].listen`.
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Don't start in-process workers (use `distcalc agent` elsewhere).
    #[arg(long)]
    pub no_agents: bool,

    /// Number of in-process workers; overrides `[agent].computing_power`.
    #[arg(long, value_name = "N")]
    pub computing_power: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct AgentArgs {
    /// Orchestrator base URL; overrides `[agent].orchestrator_url`.
    #[arg(long, value_name = "URL")]
    pub orchestrator: Option<String>,

    /// Number of workers; overrides `[agent].computing_power`.
    #[arg(long, value_name = "N")]
    pub computing_power: Option<usize>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
