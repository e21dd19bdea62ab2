//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the harness using
//! clap, plus the interactive menu the `run` command drives.

pub mod commands;
pub mod menu;

use clap::{Parser, Subcommand};

/// Cosmos Harness - interactive Azure Cosmos DB operations demo
#[derive(Parser, Debug)]
#[command(name = "cosmos-harness")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cosmos-harness.toml", env = "HARNESS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HARNESS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the store and run the interactive menu
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::run::StrategyArg;
    use crate::config::StoreTarget;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["cosmos-harness", "run"]);
        assert_eq!(cli.config, "cosmos-harness.toml");
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.store.is_none());
        assert_eq!(args.partition_strategy, StrategyArg::Distributed);
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::parse_from([
            "cosmos-harness",
            "run",
            "--store",
            "memory",
            "--seed",
            "42",
            "--partition-strategy",
            "hot",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.store, Some(StoreTarget::Memory));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.partition_strategy, StrategyArg::Hot);
    }

    #[test]
    fn test_cli_rejects_unknown_store() {
        assert!(Cli::try_parse_from(["cosmos-harness", "run", "--store", "mongo"]).is_err());
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["cosmos-harness", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["cosmos-harness", "--log-level", "debug", "run"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["cosmos-harness", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["cosmos-harness", "init", "--with-examples"]);
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert!(args.with_examples);
        assert_eq!(args.output, "cosmos-harness.toml");
    }
}
