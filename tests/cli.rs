// tests/cli.rs

use std::path::PathBuf;

use clap::Parser;
use distcalc::cli::{CliArgs, Command};
use distcalc::config::default_config_path;

#[test]
fn serve_with_overrides() {
    let args = CliArgs::try_parse_from([
        "distcalc",
        "serve",
        "--listen",
        "0.0.0.0:9000",
        "--no-agents",
        "--config",
        "custom.toml",
    ])
    .unwrap();

    assert_eq!(args.config, PathBuf::from("custom.toml"));
    match args.command {
        Command::Serve(serve) => {
            assert_eq!(serve.listen.as_deref(), Some("0.0.0.0:9000"));
            assert!(serve.no_agents);
            assert_eq!(serve.computing_power, None);
        }
        other => panic!("expected serve, got {:?}", other),
    }
}

#[test]
fn agent_defaults_to_config_values() {
    let args = CliArgs::try_parse_from(["distcalc", "agent"]).unwrap();
    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, PathBuf::from("Distcalc.toml"));
    assert!(args.log_level.is_none());
    match args.command {
        Command::Agent(agent) => {
            assert!(agent.orchestrator.is_none());
            assert!(agent.computing_power.is_none());
        }
        other => panic!("expected agent, got {:?}", other),
    }
}

#[test]
fn log_level_is_validated() {
    assert!(CliArgs::try_parse_from(["distcalc", "--log-level", "debug", "check"]).is_ok());
    assert!(CliArgs::try_parse_from(["distcalc", "--log-level", "loud", "check"]).is_err());
}

#[test]
fn a_subcommand_is_required() {
    assert!(CliArgs::try_parse_from(["distcalc"]).is_err());
}
