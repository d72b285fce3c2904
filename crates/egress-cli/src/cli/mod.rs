//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Load configuration
    let config = Config::load()?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // State file from CLI, env, or config
    let state_path = match cli.state {
        Some(path) => path,
        None => config.state_path()?,
    };

    // Create context for commands
    let ctx = commands::Context {
        config,
        output_format,
        state_path,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(ctx, args).await,
        Commands::Validate(args) => commands::validate::execute(&ctx, &args),
        Commands::Check(args) => commands::check::execute(&ctx, &args),
    }
}

/// Log to stderr; `RUST_LOG` wins, otherwise warnings only (debug with `-v`).
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
