//! GBX CLI - Inspect GameBox files from the command line
//!
//! # Commands
//!
//! - `gbx header <file>` - Decode only the header and print it
//! - `gbx dump <file>` - Decode the whole file and print the node tree as JSON
//! - `gbx batch <paths...>` - Decode many files in parallel and report failures
//! - `gbx samples <file>` - Print the ghost samples of a replay, ghost or map
//!
//! # Configuration
//!
//! Decoder options are read from `--config <file>`, or from `gbx.toml` in the
//! platform config directory:
//!
//! ```toml
//! [decode]
//! strict_chunk_sizes = false
//! max_embedded_depth = 2
//! ```

mod batch;
mod config;
mod dump;
mod header;
mod samples;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// GBX CLI - Inspect GameBox files
#[derive(Parser)]
#[command(name = "gbx")]
#[command(about = "Inspect GameBox (GBX) files")]
#[command(version)]
struct Cli {
    /// Decoder options file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every chunk as it is decoded
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode only the header
    Header(header::HeaderArgs),

    /// Decode a file and print its node tree
    Dump(dump::DumpArgs),

    /// Decode files in parallel and report which ones fail
    Batch(batch::BatchArgs),

    /// Print ghost samples
    Samples(samples::SamplesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;
    let options = config.decode;

    match cli.command {
        Commands::Header(args) => header::execute(args),
        Commands::Dump(args) => dump::execute(args, &options),
        Commands::Batch(args) => batch::execute(args, &options),
        Commands::Samples(args) => samples::execute(args, &options),
    }
}

/// Read a whole input file
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
