//! Chunk routines, one module per class family
//!
//! Each module exposes a `CHUNKS` table. Chunk ids carry their class id in the
//! upper bits, so the tables are merged into one registry without collisions.

use crate::chunk::ChunkEntry;

pub mod anchored_object;
pub mod challenge;
pub mod collector;
pub mod crystal;
pub mod ghost;
pub mod item;
pub mod macroblock;
pub mod material;
pub mod media;
pub mod record_data;
pub mod replay;

/// Every chunk table known to the decoder
pub const CHUNK_TABLES: &[&[ChunkEntry]] = &[
    challenge::CHUNKS,
    anchored_object::CHUNKS,
    collector::CHUNKS,
    ghost::CHUNKS,
    record_data::CHUNKS,
    replay::CHUNKS,
    macroblock::CHUNKS,
    media::CHUNKS,
    item::CHUNKS,
    crystal::CHUNKS,
    material::CHUNKS,
];
