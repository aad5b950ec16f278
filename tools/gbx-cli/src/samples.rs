//! Samples command - print the recorded positions of a ghost

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gbx::DecodeOptions;

#[derive(Args)]
pub struct SamplesArgs {
    /// Replay, ghost or map file
    pub file: PathBuf,
}

pub fn execute(args: SamplesArgs, options: &DecodeOptions) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let gbx = gbx::parse_gbx_with(&data, options)
        .with_context(|| format!("Failed to decode {}", args.file.display()))?;

    let samples = gbx.ghost_samples();
    if samples.is_empty() {
        tracing::warn!("{} carries no ghost samples", args.file.display());
    }
    println!("{}", serde_json::to_string_pretty(&samples)?);
    Ok(())
}
