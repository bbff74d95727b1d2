// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Netbench CLI
//!
//! Command-line interface for comparing API styles under emulated network
//! conditions. Without a subcommand the full condition matrix is run.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

use commands::Overrides;

/// Netbench - REST vs GraphQL vs RPC under simulated network conditions
#[derive(Parser)]
#[command(name = "netbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (netbench.yaml is used when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control plane URL, overriding the configuration file
    #[arg(long, global = true)]
    pub control_plane: Option<String>,

    /// Report output path, overriding the configuration file
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a proxy for every configured protocol
    Setup,

    /// Apply one network condition to all proxies
    Apply {
        /// Condition name, e.g. LTE_4G
        condition: String,
    },

    /// Clear all network conditions
    Reset,

    /// List the available network conditions
    List,

    /// Show proxies and active effects on the control plane
    Status,

    /// Run the benchmark matrix and write the report
    Run(RunArgs),
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Comma separated conditions to run, in order (default: all)
    #[arg(long, value_delimiter = ',')]
    pub conditions: Option<Vec<String>>,

    /// Iterations per protocol and condition
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub iterations: Option<u32>,

    /// Use in-process clients and an in-memory control plane
    #[arg(long)]
    pub dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    let overrides = Overrides {
        config: cli.config,
        control_plane: cli.control_plane,
        report: cli.report,
    };

    // Dispatch to command handlers
    match cli.command {
        Some(Commands::Setup) => commands::setup::execute(&overrides).await,
        Some(Commands::Apply { condition }) => {
            commands::apply::execute(&overrides, &condition).await
        }
        Some(Commands::Reset) => commands::reset::execute(&overrides).await,
        Some(Commands::List) => commands::list::execute(&overrides).await,
        Some(Commands::Status) => commands::status::execute(&overrides).await,
        Some(Commands::Run(args)) => commands::run::execute(&overrides, args).await,
        None => commands::run::execute(&overrides, RunArgs::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["netbench"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "netbench",
            "run",
            "--conditions",
            "FIBER,MOBILE_3G",
            "--iterations",
            "3",
            "--dry-run",
            "--report",
            "out.json",
        ])
        .unwrap();

        assert_eq!(cli.report, Some(PathBuf::from("out.json")));
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(
                    args.conditions,
                    Some(vec!["FIBER".to_string(), "MOBILE_3G".to_string()])
                );
                assert_eq!(args.iterations, Some(3));
                assert!(args.dry_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(Cli::try_parse_from(["netbench", "run", "--iterations", "0"]).is_err());
    }

    #[test]
    fn test_apply_requires_condition() {
        assert!(Cli::try_parse_from(["netbench", "apply"]).is_err());
        let cli = Cli::try_parse_from(["netbench", "-v", "apply", "LTE_4G"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Apply { condition }) if condition == "LTE_4G"));
    }
}
