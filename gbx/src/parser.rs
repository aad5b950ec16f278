//! Top-level decoding entry points

use crate::compression::{Codec, read_compressed_block};
use crate::cursor::Cursor;
use crate::document::Gbx;
use crate::error::{Error, Result};
use crate::header::{Header, read_header};
use crate::lookback::LookbackTable;
use crate::options::DecodeOptions;
use crate::reader::Reader;
use crate::reference_table::read_reference_table;

/// Decode a complete GBX file with default options
pub fn parse_gbx(bytes: &[u8]) -> Result<Gbx> {
    parse_gbx_with(bytes, &DecodeOptions::default())
}

/// Decode a complete GBX file
pub fn parse_gbx_with(bytes: &[u8], options: &DecodeOptions) -> Result<Gbx> {
    parse_nested(bytes, options, 0)
}

/// Decode only the header, leaving the body untouched
pub fn parse_header(bytes: &[u8]) -> Result<Header> {
    let mut cursor = Cursor::new(bytes);
    read_header(&mut cursor, &mut LookbackTable::new())
}

/// Decode a file found `depth` levels deep in embedded archives
pub(crate) fn parse_nested(bytes: &[u8], options: &DecodeOptions, depth: u32) -> Result<Gbx> {
    let mut cursor = Cursor::new(bytes);
    let header = read_header(&mut cursor, &mut LookbackTable::new())?;
    tracing::debug!(
        version = header.version,
        nodes = header.num_nodes,
        "header decoded, root class {:#010x}",
        header.class_id
    );

    let reference_table = read_reference_table(&mut cursor)?;

    let decompressed;
    let body = if header.body_compressed {
        decompressed = read_compressed_block(&mut cursor, Codec::Lzo1x)?;
        Cursor::new(&decompressed)
    } else {
        let remaining = cursor.remaining();
        cursor.sub_cursor(remaining)?
    };

    let mut reader = Reader::new(body, options.clone(), depth);
    let root = reader
        .decode_node(Some(header.class_id))?
        .ok_or_else(|| Error::Unsupported {
            chunk_id: header.class_id,
            what: "null root class".to_owned(),
            offset: 0,
        })?;

    Ok(Gbx {
        header,
        reference_table,
        body: root,
        nodes: reader.into_arena(),
    })
}
