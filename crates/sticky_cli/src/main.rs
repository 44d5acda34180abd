//! Sticky CLI
//!
//! Replays scroll offsets against a header described in a TOML scenario and
//! prints what the header and each element look like at every offset.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod replay;
mod scenario;

use replay::Replay;
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "sticky")]
#[command(author, version, about = "Replay scroll offsets against a sticky header")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the scenario's scroll offsets
    Replay {
        /// Scenario file
        #[arg(default_value = "header.toml")]
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
        /// Replay these offsets instead of the scenario's
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        offsets: Option<Vec<f32>>,
    },
    /// Load and validate a scenario
    Check {
        #[arg(default_value = "header.toml")]
        path: PathBuf,
    },
    /// Write a sample scenario
    Init {
        #[arg(default_value = "header.toml")]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            path,
            format,
            offsets,
        } => {
            let scenario = Scenario::load(&path)?;
            let mut replay = Replay::build(&scenario)?;
            let offsets = offsets.unwrap_or_else(|| scenario.offsets());
            let snapshots = replay.run(&offsets);

            match format {
                Format::Text => print!("{}", replay::render_text(&snapshots)),
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&snapshots).context("Failed to encode report")?
                ),
            }
        }
        Commands::Check { path } => {
            let scenario = Scenario::load(&path)?;
            let replay = Replay::build(&scenario)?;
            let registry = replay.header().registry();
            println!(
                "{}: ok ({} elements, {} background layers, content height {})",
                path.display(),
                registry.element_count(),
                registry.background_count(),
                replay.content_size().height
            );
        }
        Commands::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite it.",
                    path.display()
                );
            }
            fs::write(&path, scenario::SAMPLE)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}
