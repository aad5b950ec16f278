//! zlib decompression for embedded compressed blobs

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{Error, Result};

/// Inflate a zlib stream that must produce exactly `expected_len` bytes
pub fn decompress_zlib(input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    // One extra byte is enough to detect an overlong stream
    let limit = expected_len as u64 + 1;
    let mut decoder = ZlibDecoder::new(input).take(limit);
    let mut out = Vec::with_capacity(expected_len);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::CorruptCompressedData {
            codec: "zlib",
            reason: e.to_string(),
        })?;

    if out.len() != expected_len {
        return Err(Error::CompressedSizeMismatch {
            expected: expected_len,
            actual: out.len(),
        });
    }

    Ok(out)
}
