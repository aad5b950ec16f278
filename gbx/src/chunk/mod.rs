//! Chunk registry
//!
//! Every supported class contributes a static table of [`ChunkEntry`] values. The
//! tables are indexed once by chunk id; chunk ids embed their class id, so a single
//! flat map covers all classes.

use std::sync::OnceLock;

use hashbrown::HashMap;

use crate::classes;
use crate::error::Result;
use crate::node::{Fields, Node};
use crate::reader::Reader;

/// How a chunk is framed in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Payload follows the chunk id directly
    Ordinary,
    /// "SKIP" marker and size, payload is not decoded
    Skippable,
    /// "SKIP" marker and size, payload is decoded and must fill the size exactly
    ParsableSkippable,
}

pub type ReadFn = fn(&mut Reader<'_>) -> Result<Fields>;
pub type MutateFn = fn(&mut Reader<'_>, &mut Node) -> Result<Fields>;

/// Chunk routine
#[derive(Clone, Copy)]
pub enum Handler {
    /// Produces fields from the stream alone
    Read(ReadFn),
    /// Needs the fields merged so far, and may annotate them in place
    Mutate(MutateFn),
}

#[derive(Clone, Copy)]
pub struct ChunkEntry {
    pub id: u32,
    pub kind: ChunkKind,
    pub handler: Option<Handler>,
}

impl ChunkEntry {
    pub const fn read(id: u32, f: ReadFn) -> Self {
        Self {
            id,
            kind: ChunkKind::Ordinary,
            handler: Some(Handler::Read(f)),
        }
    }

    pub const fn mutate(id: u32, f: MutateFn) -> Self {
        Self {
            id,
            kind: ChunkKind::Ordinary,
            handler: Some(Handler::Mutate(f)),
        }
    }

    pub const fn skip(id: u32) -> Self {
        Self {
            id,
            kind: ChunkKind::Skippable,
            handler: None,
        }
    }

    pub const fn skippable(id: u32, f: ReadFn) -> Self {
        Self {
            id,
            kind: ChunkKind::ParsableSkippable,
            handler: Some(Handler::Read(f)),
        }
    }

    pub const fn skippable_mutate(id: u32, f: MutateFn) -> Self {
        Self {
            id,
            kind: ChunkKind::ParsableSkippable,
            handler: Some(Handler::Mutate(f)),
        }
    }
}

impl std::fmt::Debug for ChunkEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkEntry")
            .field("id", &format_args!("{:#010x}", self.id))
            .field("kind", &self.kind)
            .finish()
    }
}

fn registry() -> &'static HashMap<u32, &'static ChunkEntry> {
    static REGISTRY: OnceLock<HashMap<u32, &'static ChunkEntry>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        for table in classes::CHUNK_TABLES {
            for entry in table.iter() {
                map.insert(entry.id, entry);
            }
        }
        tracing::trace!(chunks = map.len(), "chunk registry built");
        map
    })
}

/// Look up the routine for `id`
pub fn lookup(id: u32) -> Option<&'static ChunkEntry> {
    registry().get(&id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn test_no_duplicate_ids() {
        let mut seen = HashSet::new();
        for table in classes::CHUNK_TABLES {
            for entry in table.iter() {
                assert!(seen.insert(entry.id), "duplicate chunk {:#010x}", entry.id);
            }
        }
    }

    #[test]
    fn test_lookup_kinds() {
        assert_eq!(lookup(0x0304_3011).unwrap().kind, ChunkKind::Ordinary);
        assert_eq!(lookup(0x0304_3018).unwrap().kind, ChunkKind::ParsableSkippable);
        assert_eq!(lookup(0x0304_3017).unwrap().kind, ChunkKind::Skippable);
        assert!(lookup(0x0304_3099).is_none());
    }

    #[test]
    fn test_only_skippable_entries_lack_handlers() {
        for table in classes::CHUNK_TABLES {
            for entry in table.iter() {
                assert_eq!(
                    entry.handler.is_none(),
                    entry.kind == ChunkKind::Skippable,
                    "{entry:?}"
                );
            }
        }
    }
}
