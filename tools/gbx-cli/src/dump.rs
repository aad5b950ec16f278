//! Dump command - decode a whole file to JSON

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use gbx::DecodeOptions;

#[derive(Args)]
pub struct DumpArgs {
    /// GBX file to decode
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON
    Json,
    /// Single-line JSON
    Compact,
}

pub fn execute(args: DumpArgs, options: &DecodeOptions) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let gbx = gbx::parse_gbx_with(&data, options)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;

    tracing::info!(
        nodes = gbx.nodes.len(),
        "decoded {}",
        args.file.display()
    );

    let json = match args.output {
        OutputFormat::Json => serde_json::to_string_pretty(&gbx)?,
        OutputFormat::Compact => serde_json::to_string(&gbx)?,
    };
    println!("{json}");
    Ok(())
}
