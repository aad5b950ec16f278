//! Header command - decode only the header of a file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

#[derive(Args)]
pub struct HeaderArgs {
    /// GBX file to inspect
    pub file: PathBuf,
}

pub fn execute(args: HeaderArgs) -> Result<()> {
    let data = crate::read_input(&args.file)?;
    let header = gbx::parse_header(&data)
        .with_context(|| format!("Failed to decode header of {}", args.file.display()))?;

    println!("{}", serde_json::to_string_pretty(&header)?);
    Ok(())
}
