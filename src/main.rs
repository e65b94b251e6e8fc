//! nxos-pim - Declarative PIM interface management for Cisco NX-OS
//!
//! This is the main entry point for the nxos-pim CLI.

mod cli;

use anyhow::Result;
use cli::commands::{list_modules, CommandContext};
use cli::output::{OutputFormatter, Palette};
use cli::{Cli, Commands};
use nxos_pim::config::Config;
use nxos_pim::telemetry::{init_logging, LoggingConfig};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");
const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {:#}", e);
        Config::default()
    });

    // Initialize logging from config and verbosity
    let logging = LoggingConfig::from_settings(&config.logging, cli.verbosity());
    if let Err(e) = init_logging(logging) {
        eprintln!("Warning: {}", e);
    }

    if cli.no_color || !config.colors.enabled {
        colored::control::set_override(false);
    }

    // Display version if verbose
    if cli.verbosity() >= 2 {
        eprintln!("nxos-pim v{} by {}", VERSION, AUTHORS);
    }

    let format = cli.output_format(&config.defaults.output);
    let mut ctx = CommandContext::new(&cli, config);

    let exit_code = match run(&cli, &mut ctx) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            OutputFormatter::new(!cli.no_color, format, 0)
                .with_palette(Palette::from_config(&ctx.config.colors))
                .error(&format!("{:#}", e));
            e.downcast_ref::<nxos_pim::Error>()
                .map(nxos_pim::Error::exit_code)
                .unwrap_or(1)
        }
    };

    std::process::exit(exit_code);
}

/// Execute the selected subcommand
fn run(cli: &Cli, ctx: &mut CommandContext) -> Result<i32> {
    match &cli.command {
        Commands::Apply(args) => args.execute(ctx),
        Commands::Check(args) => args.execute(ctx),
        Commands::Parse(args) => args.execute(ctx),
        Commands::ListModules => list_modules(ctx),
    }
}
