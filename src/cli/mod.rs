//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Porter using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Porter - survey data export worker
#[derive(Parser, Debug)]
#[command(name = "porter")]
#[command(version, about, long_about = None)]
#[command(author = "Porter Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "porter.toml", env = "PORTER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PORTER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Consume export requests and run the export pipeline
    Run(commands::run::RunArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::parse_from(["porter", "run"]);
        assert_eq!(cli.config, "porter.toml");
        assert!(matches!(cli.command, Commands::Run(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["porter", "--config", "custom.toml", "run"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_run_overrides() {
        let cli = Cli::parse_from(["porter", "run", "--topic", "exports-staging"]);
        match cli.command {
            Commands::Run(args) => assert_eq!(args.topic.as_deref(), Some("exports-staging")),
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["porter", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }
}
