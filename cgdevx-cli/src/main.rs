//! cgdevx — GitOps repository synchronization CLI.
//!
//! # Usage
//!
//! ```text
//! cgdevx render  [--profile <path>] [--workspace <path>]
//! cgdevx publish [--profile <path>] [--workspace <path>] [--dry-run]
//! cgdevx sync    [--profile <path>] [--workspace <path>] [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{publish::PublishArgs, render::RenderArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "cgdevx",
    version,
    about = "Bootstrap and synchronize a GitOps repository from a versioned template",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the template, build the repository layout, and apply all
    /// substitutions and patches.
    Render(RenderArgs),

    /// Publish the rendered tree to the output remote.
    Publish(PublishArgs),

    /// Render then publish.
    Sync(SyncArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => args.run(),
        Commands::Publish(args) => args.run(),
        Commands::Sync(args) => args.run(),
    }
}
