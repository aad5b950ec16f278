//! GBX - decoder for the GameBox binary container
//!
//! This crate decodes maps, replays, ghosts and items stored in the GBX format
//! into a typed node graph.
//!
//! # Architecture
//!
//! - [`parse_gbx`] / [`parse_gbx_with`] - Decode a complete file into a [`Gbx`]
//! - [`parse_header`] - Decode only the header and its user data chunks
//! - [`Reader`] - One decoding session: cursor, lookback table, node arena
//! - [`chunk`] - Registry of chunk routines, contributed by [`classes`]
//! - [`NodeArena`] - Owner of decoded nodes, addressed by [`NodeId`]

pub mod chunk;
pub mod classes;
pub mod collections;
pub mod compression;
pub mod cursor;
pub mod document;
pub mod embedded;
pub mod error;
pub mod header;
pub mod lookback;
pub mod node;
pub mod options;
pub mod parser;
pub mod reader;
pub mod reference_table;
pub mod types;

pub use cursor::Cursor;
pub use document::Gbx;
pub use error::{Error, Result};
pub use header::{Header, HeaderChunk};
pub use node::{
    Block, EmbeddedEntry, EmbeddedFailure, Fields, MacroBlockInstance, Node, NodeArena, NodeId,
    Sample, Value,
};
pub use options::DecodeOptions;
pub use parser::{parse_gbx, parse_gbx_with, parse_header};
pub use reader::Reader;
pub use reference_table::ReferenceTable;

// =============================================================================
// Container constants
// =============================================================================

/// Magic bytes at the start of every file
pub const GBX_MAGIC: &[u8; 3] = b"GBX";

/// Oldest container version the decoder reads
pub const MIN_GBX_VERSION: u16 = 6;

// =============================================================================
// Body constants
// =============================================================================

/// Chunk id that terminates a node
pub const NODE_END: u32 = 0xFACA_DE01;

/// "SKIP" marker preceding the size of a skippable chunk
pub const SKIP_MARKER: u32 = 0x534B_4950;

/// Class id standing for a null node
pub const NULL_CLASS_ID: u32 = 0xFFFF_FFFF;
