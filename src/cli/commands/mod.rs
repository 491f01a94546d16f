//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod sachsen;
mod weser;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "awo")]
#[command(about = "Scrape the AWO Sachsen and AWO Weser-Ems facility directories to CSV")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./awo.toml when present)
    #[arg(short, long, global = true, env = "AWO_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Reveal every district on the AWO Sachsen search page and export it
    Sachsen {
        /// Extract from a saved page instead of opening the browser
        #[arg(long)]
        from_snapshot: Option<PathBuf>,
        /// CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand the AWO Weser-Ems location list and export every detail page
    Weser {
        /// CSV output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run both scrapers with their configured outputs
    All,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Sachsen {
            from_snapshot,
            output,
        } => sachsen::cmd_sachsen(&settings, from_snapshot, output).await,
        Commands::Weser { output } => weser::cmd_weser(&settings, output).await,
        Commands::All => {
            sachsen::cmd_sachsen(&settings, None, None).await?;
            weser::cmd_weser(&settings, None).await
        }
    }
}
