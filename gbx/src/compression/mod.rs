//! Compression codecs used inside GBX files
//!
//! Bodies are LZO1X compressed; individual chunk payloads (ghost samples, record
//! data) carry zlib blobs. Both sit behind the same framing:
//! `uncompressed_size: u32, compressed_size: u32, payload`.

mod lzo1x;
mod zlib;

pub use lzo1x::decompress_lzo1x;
pub use zlib::decompress_zlib;

use crate::cursor::Cursor;
use crate::error::Result;

/// Codec of a compressed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Lzo1x,
    Zlib,
}

impl Codec {
    pub fn decompress(self, input: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        match self {
            Self::Lzo1x => decompress_lzo1x(input, expected_len),
            Self::Zlib => decompress_zlib(input, expected_len),
        }
    }
}

/// Read a size-framed compressed block and decompress it
///
/// The decompressed length must equal the declared uncompressed size.
pub fn read_compressed_block(cursor: &mut Cursor<'_>, codec: Codec) -> Result<Vec<u8>> {
    let uncompressed_size = cursor.read_u32()? as usize;
    let compressed_size = cursor.read_u32()? as usize;
    let payload = cursor.read_bytes(compressed_size)?;
    tracing::trace!(
        ?codec,
        compressed_size,
        uncompressed_size,
        "decompressing block"
    );
    codec.decompress(payload, uncompressed_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_framed_lzo_block() {
        let payload = [22, b'h', b'e', b'l', b'l', b'o', 0x11, 0, 0];
        let mut data = 5u32.to_le_bytes().to_vec();
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(&payload);

        let mut cursor = Cursor::new(&data);
        let out = read_compressed_block(&mut cursor, Codec::Lzo1x).unwrap();
        assert_eq!(out, b"hello");
        assert!(cursor.is_empty());
    }

    #[test]
    fn test_framed_block_truncated_payload() {
        let mut data = 5u32.to_le_bytes().to_vec();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&[1, 2, 3]);

        let mut cursor = Cursor::new(&data);
        assert!(matches!(
            read_compressed_block(&mut cursor, Codec::Zlib),
            Err(Error::OutOfData { need: 100, .. })
        ));
    }
}
