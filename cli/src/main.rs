//! # lumigrate Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the lumigrate CLI, which converts Lumen projects into the
//! Laravel project structure. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - `migrate` runs one migration in the foreground and prints a summary.
//! - `srv` hosts the HTTP trigger that launches migrations in the background.
//! - Errors from a handler are reported here and turn into exit code 1.
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! lumigrate --help
//!
//! # Migrate with more log output
//! lumigrate -vv migrate ./api --with-env
//! ```
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Command handlers (migrate, srv).
mod common; // Shared utilities (fs, process).
mod core; // Core infrastructure (errors, config).

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "lumigrate",
    about = "🦀 lumigrate: Lumen to Laravel project migration",
    long_about = "Converts a Lumen project into a Laravel project: scaffolds the Laravel skeleton,\n\
                  carries the sources over, merges composer.json and rewrites the routes.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Migrate a Lumen project in the foreground.
    #[command(alias = "m")]
    Migrate(commands::migrate::MigrateArgs),
    /// Run the HTTP migration trigger server.
    Srv(commands::srv::SrvArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Migrate(args) => commands::migrate::handle_migrate(args).await,
        Commands::Srv(args) => commands::srv::handle_srv(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
