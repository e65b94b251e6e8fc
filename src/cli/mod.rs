//! CLI module for nxos-pim
//!
//! This module provides the command-line interface for nxos-pim,
//! including argument parsing, module parameter loading, and subcommand
//! handling.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nxos-pim - Declarative PIM interface management for Cisco NX-OS
///
/// Reads a device's running-config, compares the PIM settings of one
/// interface against the requested state and pushes the minimal command set.
#[derive(Parser, Debug, Clone)]
#[command(name = "nxos-pim")]
#[command(author = "nxos-pim Contributors")]
#[command(version)]
#[command(about = "Declarative PIM interface management for Cisco NX-OS", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run in check mode (report commands, push nothing)
    #[arg(long = "check", global = true)]
    pub check_mode: bool,

    /// Show the configuration diff
    #[arg(long = "diff", global = true)]
    pub diff_mode: bool,

    /// Output format (defaults to the configured one, then human)
    #[arg(long, global = true)]
    pub output: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "NXOS_PIM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Reconcile an interface against the running-config
    Apply(commands::apply::ApplyArgs),

    /// Report the commands an apply would push (dry-run)
    Check(commands::apply::CheckArgs),

    /// Parse the PIM state of an interface from a running-config
    Parse(commands::parse::ParseArgs),

    /// List available modules
    #[command(name = "list-modules")]
    ListModules,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// The output format, falling back to the configured default
    pub fn output_format(&self, configured: &str) -> OutputFormat {
        self.output
            .or_else(|| OutputFormat::from_str(configured, true).ok())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "nxos-pim",
            "apply",
            "--running-config",
            "n9k.cfg",
            "-a",
            "interface=eth1/33",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Apply(_)));
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["nxos-pim", "-vvvv", "list-modules"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nxos-pim",
            "apply",
            "-a",
            "interface=eth1/33",
            "-a",
            "dr_prio=10",
            "--check",
            "--output",
            "json",
        ])
        .unwrap();
        assert!(cli.check_mode);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Apply(args) => assert_eq!(args.target.args.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_output_format_fallback() {
        let cli = Cli::try_parse_from(["nxos-pim", "list-modules"]).unwrap();
        assert_eq!(cli.output_format("yaml"), OutputFormat::Yaml);
        assert_eq!(cli.output_format("bogus"), OutputFormat::Human);

        let cli = Cli::try_parse_from(["nxos-pim", "--output", "json", "list-modules"]).unwrap();
        assert_eq!(cli.output_format("yaml"), OutputFormat::Json);
    }

    #[test]
    fn test_unknown_output_rejected() {
        assert!(Cli::try_parse_from(["nxos-pim", "--output", "xml", "list-modules"]).is_err());
    }
}
