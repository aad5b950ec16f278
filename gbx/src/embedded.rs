//! Zip archives of GBX files embedded in maps
//!
//! Custom items and their textures travel inside the map as a zip blob. Each entry
//! is decoded in its own session; a failing entry is recorded and does not abort
//! the map.

use std::io::{Cursor, Read};

use crate::error::{Error, Result};
use crate::node::{EmbeddedEntry, EmbeddedFailure};
use crate::options::DecodeOptions;
use crate::parser::parse_nested;

/// Decode every file entry of an embedded archive
///
/// # Arguments
/// * `data` - The zip archive bytes
/// * `offset` - Absolute offset of the archive, for error reporting
/// * `options` - Options of the enclosing session
/// * `depth` - Embedding depth of the enclosing session
pub fn decode_archive(
    data: &[u8],
    offset: usize,
    options: &DecodeOptions,
    depth: u32,
) -> Result<(Vec<EmbeddedEntry>, Vec<EmbeddedFailure>)> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| Error::EmbeddedArchive {
            offset,
            reason: e.to_string(),
        })?;

    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| Error::EmbeddedArchive {
            offset,
            reason: e.to_string(),
        })?;
        if file.is_dir() {
            continue;
        }
        let name = basename(file.name()).to_owned();

        if depth + 1 > options.max_embedded_depth {
            tracing::warn!("skipping embedded entry {name}: nested too deeply");
            failures.push(EmbeddedFailure {
                name,
                error: format!("embedded archives nested deeper than {}", options.max_embedded_depth),
            });
            continue;
        }

        // Declared size is untrusted
        let hint = usize::try_from(file.size()).unwrap_or(0).min(data.len());
        let mut bytes = Vec::with_capacity(hint);
        if let Err(e) = file.read_to_end(&mut bytes) {
            tracing::warn!("failed to read embedded entry {name}: {e}");
            failures.push(EmbeddedFailure {
                name,
                error: e.to_string(),
            });
            continue;
        }

        match parse_nested(&bytes, options, depth + 1) {
            Ok(gbx) => {
                tracing::debug!("decoded embedded entry {name}");
                entries.push(EmbeddedEntry { name, gbx });
            }
            Err(e) => {
                tracing::warn!("failed to decode embedded entry {name}: {e}");
                failures.push(EmbeddedFailure {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok((entries, failures))
}

fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
