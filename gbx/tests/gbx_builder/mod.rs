//! Byte-level construction of GBX files for integration tests.
//!
//! Bodies are assembled chunk by chunk with [`Bytes`], then wrapped in a header
//! and an empty reference table by [`file`] or [`compressed_file`].

#![allow(dead_code)]

use std::io::Write;

pub const NODE_END: u32 = 0xFACA_DE01;
pub const SKIP: u32 = 0x534B_4950;

/// Lookback value introducing a new string
pub const LOOKBACK_NEW: u32 = 0x4000_0000;
/// Lookback marker read before the first string of a session
pub const LOOKBACK_VERSION: u32 = 3;

/// Size of the fixed header written by [`file`] without user data
pub const HEADER_LEN: usize = 21;
/// Offset of the first body byte of an uncompressed [`file`]
pub const BODY_OFFSET: usize = HEADER_LEN + 4;

#[derive(Default, Clone)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn string(self, s: &str) -> Self {
        self.u32(s.len() as u32).raw(s.as_bytes())
    }

    pub fn bytes(self, b: &[u8]) -> Self {
        self.u32(b.len() as u32).raw(b)
    }

    /// New lookback string
    pub fn lookback(self, s: &str) -> Self {
        self.u32(LOOKBACK_NEW).string(s)
    }

    /// Back-reference to the `index`th stored lookback string (1-based)
    pub fn lookback_ref(self, index: u32) -> Self {
        self.u32(LOOKBACK_NEW | index)
    }

    /// Reference slot (1-based) followed by its class id, for a first occurrence
    pub fn node_ref(self, slot: i32, class_id: u32) -> Self {
        self.i32(slot).u32(class_id)
    }

    pub fn chunk(self, id: u32) -> Self {
        self.u32(id)
    }

    /// Skippable chunk: id, "SKIP", size, payload
    pub fn skippable(self, id: u32, payload: &Bytes) -> Self {
        self.u32(id).u32(SKIP).u32(payload.len() as u32).raw(&payload.0)
    }

    pub fn end(self) -> Self {
        self.u32(NODE_END)
    }
}

fn header(class_id: u32, body_compressed: bool) -> Bytes {
    Bytes::new()
        .raw(b"GBX")
        .u16(6)
        .u8(b'B')
        .u8(b'U')
        .u8(if body_compressed { b'C' } else { b'U' })
        .u8(b'R')
        .u32(class_id)
        .u32(0) // user data size
        .u32(1) // node count
}

/// Uncompressed file with root class `class_id`
pub fn file(class_id: u32, body: &Bytes) -> Vec<u8> {
    header(class_id, false).u32(0).raw(&body.0).0
}

/// File with an LZO1X body made of a single literal run
pub fn compressed_file(class_id: u32, body: &Bytes) -> Vec<u8> {
    let payload = lzo_literal(&body.0);
    header(class_id, true)
        .u32(0)
        .u32(body.len() as u32)
        .u32(payload.len() as u32)
        .raw(&payload)
        .0
}

/// Encode `data` (at most 238 bytes) as one literal run followed by the end marker
pub fn lzo_literal(data: &[u8]) -> Vec<u8> {
    assert!(data.len() <= 238, "literal run too long for the test encoder");
    let mut out = vec![17 + data.len() as u8];
    out.extend_from_slice(data);
    out.extend_from_slice(&[0x11, 0, 0]);
    out
}

/// zlib block in the `(uncompressed, compressed, payload)` framing
pub fn zlib_block(data: &[u8]) -> Bytes {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data).unwrap();
    let compressed = encoder.finish().unwrap();
    Bytes::new()
        .u32(data.len() as u32)
        .u32(compressed.len() as u32)
        .raw(&compressed)
}

/// Zip archive holding `files`
pub fn zip_archive(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
