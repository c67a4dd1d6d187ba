// src/lib.rs

pub mod agent;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod parser;
pub mod server;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::agent::{AgentPool, HttpTaskSource};
use crate::cli::{AgentArgs, CliArgs, Command, ServeArgs};
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::engine::{Orchestrator, RuntimeOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + environment overrides)
/// - the orchestrator (scheduler, HTTP server, lease sweeper)
/// - in-process or remote agent pools
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    match args.command {
        Command::Check => {
            print_config(&cfg)?;
            Ok(())
        }
        Command::Serve(serve) => run_orchestrator(&mut cfg, serve).await,
        Command::Agent(agent) => run_agents(&mut cfg, agent).await,
    }
}

async fn run_orchestrator(cfg: &mut ConfigFile, args: ServeArgs) -> Result<()> {
    if let Some(listen) = args.listen {
        cfg.server.listen = listen;
    }
    let options = RuntimeOptions {
        run_agents: !args.no_agents,
        computing_power: args.computing_power,
    };

    let orchestrator = Orchestrator::start(cfg, options).await?;
    info!(url = %orchestrator.base_url(), "distcalc orchestrator ready");

    wait_for_ctrl_c().await;
    orchestrator.shutdown().await?;
    Ok(())
}

async fn run_agents(cfg: &mut ConfigFile, args: AgentArgs) -> Result<()> {
    if let Some(url) = args.orchestrator {
        cfg.agent.orchestrator_url = url;
    }
    let computing_power = args
        .computing_power
        .unwrap_or(cfg.agent.computing_power)
        .max(1);

    info!(
        orchestrator = %cfg.agent.orchestrator_url,
        computing_power,
        "starting remote agent pool"
    );

    let source = Arc::new(HttpTaskSource::new(&cfg.agent.orchestrator_url));
    let pool = AgentPool::spawn(source, computing_power, cfg.agent.poll_interval());

    wait_for_ctrl_c().await;
    pool.shutdown().await;
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
    }
    info!("shutdown requested");
}

/// Dry-run output: print the effective configuration.
fn print_config(cfg: &ConfigFile) -> Result<()> {
    println!("distcalc config check");
    println!("{}", toml::to_string_pretty(cfg).context("rendering config")?);
    debug!("config check complete (nothing started)");
    Ok(())
}
