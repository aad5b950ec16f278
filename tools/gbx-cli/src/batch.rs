//! Batch command - decode many files in parallel
//!
//! Directories are searched recursively for `*.gbx` files (case-insensitive).

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use gbx::DecodeOptions;
use rayon::prelude::*;
use walkdir::WalkDir;

#[derive(Args)]
pub struct BatchArgs {
    /// Files or directories to decode
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Result of decoding one file
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Decoded {
        class_id: u32,
        nodes: usize,
    },
    Failed {
        kind: &'static str,
        offset: Option<usize>,
        message: String,
    },
    Unreadable(String),
}

impl Outcome {
    fn is_success(&self) -> bool {
        matches!(self, Self::Decoded { .. })
    }
}

pub fn execute(args: BatchArgs, options: &DecodeOptions) -> Result<()> {
    let files = collect_files(&args.paths);
    tracing::info!("decoding {} files", files.len());

    let results: Vec<(PathBuf, Outcome)> = files
        .into_par_iter()
        .map(|path| {
            let outcome = decode_file(&path, options);
            (path, outcome)
        })
        .collect();

    let mut failed = 0;
    for (path, outcome) in &results {
        if !outcome.is_success() {
            failed += 1;
        }
        println!("{}", report_line(path, outcome));
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to decode", results.len());
    }
    Ok(())
}

/// Expand directories into the GBX files they contain, keeping explicit files as given
pub fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_gbx(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn is_gbx(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gbx"))
}

pub fn decode_file(path: &Path, options: &DecodeOptions) -> Outcome {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => return Outcome::Unreadable(e.to_string()),
    };
    match gbx::parse_gbx_with(&data, options) {
        Ok(gbx) => Outcome::Decoded {
            class_id: gbx.body().class_id,
            nodes: gbx.nodes.len(),
        },
        Err(e) => {
            tracing::debug!("{}: {e}", path.display());
            Outcome::Failed {
                kind: e.kind(),
                offset: e.offset(),
                message: e.to_string(),
            }
        }
    }
}

fn report_line(path: &Path, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Decoded { class_id, nodes } => {
            format!("ok    {} ({class_id:#010x}, {nodes} nodes)", path.display())
        }
        Outcome::Failed {
            kind,
            offset: Some(offset),
            message,
        } => format!("FAIL  {} {kind} at {offset:#x}: {message}", path.display()),
        Outcome::Failed {
            kind,
            offset: None,
            message,
        } => format!("FAIL  {} {kind}: {message}", path.display()),
        Outcome::Unreadable(reason) => format!("FAIL  {} unreadable: {reason}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid file: an empty collector list
    fn minimal_gbx() -> Vec<u8> {
        let mut data = b"GBX".to_vec();
        data.extend_from_slice(&6u16.to_le_bytes());
        data.extend_from_slice(b"BUUR");
        for v in [0x0301_B000u32, 0, 1, 0, 0x0301_B000, 0, 0xFACA_DE01] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }

    #[test]
    fn test_collect_files_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.Map.Gbx"), b"").unwrap();
        std::fs::write(dir.path().join("sub/b.Replay.GBX"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| is_gbx(f)));
    }

    #[test]
    fn test_decode_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.Gbx");
        let bad = dir.path().join("bad.Gbx");
        std::fs::write(&good, minimal_gbx()).unwrap();
        std::fs::write(&bad, b"PNG garbage").unwrap();

        let options = DecodeOptions::default();
        assert_eq!(
            decode_file(&good, &options),
            Outcome::Decoded {
                class_id: 0x0301_B000,
                nodes: 1
            }
        );

        match decode_file(&bad, &options) {
            Outcome::Failed { kind, offset, .. } => {
                assert_eq!(kind, "InvalidMagic");
                assert_eq!(offset, Some(0));
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        assert!(matches!(
            decode_file(&dir.path().join("missing.Gbx"), &options),
            Outcome::Unreadable(_)
        ));
    }

    #[test]
    fn test_report_line() {
        let line = report_line(
            Path::new("x.Gbx"),
            &Outcome::Failed {
                kind: "UnknownChunk",
                offset: Some(0x40),
                message: "unknown chunk".into(),
            },
        );
        assert_eq!(line, "FAIL  x.Gbx UnknownChunk at 0x40: unknown chunk");
    }
}
