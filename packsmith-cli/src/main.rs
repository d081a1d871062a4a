//! Packsmith CLI - Command-line interface
//!
//! This binary drives the packsmith library: one-shot builds and
//! validations of a workspace document, or the long-running daemon that
//! rebuilds and publishes on a daily cycle.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packsmith", version, about = "Versioned resource-pack build pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Materialize every branch of the workspace's packs
    Build(commands::build::BuildArgs),
    /// Compare a built branch against a platform reference catalog
    Validate(commands::validate::ValidateArgs),
    /// Run the daily build-and-publish daemon
    Daemon(commands::daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build(args) => commands::build::run(args).await,
        Command::Validate(args) => commands::validate::run(args).await,
        Command::Daemon(args) => commands::daemon::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
