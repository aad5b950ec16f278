//! Decoding session over a GBX body
//!
//! A [`Reader`] owns everything that is scoped to one decode: the lookback table,
//! the map from stream reference slots to arena ids, and the node arena itself.
//! It dereferences to the underlying [`Cursor`] so chunk routines read primitives
//! directly from it.

use std::ops::{Deref, DerefMut};

use hashbrown::HashMap;

use crate::chunk::{self, ChunkEntry, ChunkKind, Handler};
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::lookback::{LookbackTable, Meta};
use crate::node::{Fields, Node, NodeArena, NodeId};
use crate::options::DecodeOptions;
use crate::{NODE_END, NULL_CLASS_ID, SKIP_MARKER};

pub struct Reader<'a> {
    cursor: Cursor<'a>,
    lookback: LookbackTable,
    slots: HashMap<u32, NodeId>,
    arena: NodeArena,
    options: DecodeOptions,
    depth: u32,
    embedded_depth: u32,
}

impl<'a> Reader<'a> {
    pub fn new(cursor: Cursor<'a>, options: DecodeOptions, embedded_depth: u32) -> Self {
        Self {
            cursor,
            lookback: LookbackTable::new(),
            slots: HashMap::new(),
            arena: NodeArena::new(),
            options,
            depth: 0,
            embedded_depth,
        }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Nesting level of the embedded archive this session decodes (0 for a top-level file)
    pub fn embedded_depth(&self) -> u32 {
        self.embedded_depth
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Node already decoded in this session
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(id)
    }

    pub fn into_arena(self) -> NodeArena {
        self.arena
    }

    // =========================================================================
    // Strings
    // =========================================================================

    pub fn read_lookback(&mut self) -> Result<String> {
        self.lookback.read(&mut self.cursor, false)
    }

    /// Lookback string whose bare numeric values are rendered as decimal text
    pub fn read_lookback_raw(&mut self) -> Result<String> {
        self.lookback.read(&mut self.cursor, true)
    }

    pub fn read_meta(&mut self) -> Result<Meta> {
        self.lookback.read_meta(&mut self.cursor)
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Read an `i32` count followed by that many elements. A negative count is an
    /// empty list.
    pub fn read_list<T>(&mut self, f: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_i32()?;
        self.read_list_n(usize::try_from(count).unwrap_or(0), f)
    }

    /// Read exactly `n` elements.
    pub fn read_list_n<T>(
        &mut self,
        n: usize,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        // A corrupt count must not reserve more than the buffer could hold
        let mut out = Vec::with_capacity(n.min(self.remaining()));
        for _ in 0..n {
            out.push(f(self)?);
        }
        Ok(out)
    }

    pub fn read_node_ref_list(&mut self) -> Result<Vec<Option<NodeId>>> {
        self.read_list(|r| r.read_node_ref())
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Resolve a node reference.
    ///
    /// The first occurrence of a slot carries the node inline; later occurrences of
    /// the same slot return the same id without reading anything further.
    pub fn read_node_ref(&mut self) -> Result<Option<NodeId>> {
        let raw = self.read_i32()? as i64 - 1;
        if raw < 0 {
            return Ok(None);
        }
        let slot = raw as u32;

        if let Some(&id) = self.slots.get(&slot) {
            tracing::trace!(slot, id = id.0, "shared node reference");
            return Ok(Some(id));
        }

        let class_id = self.read_u32()?;
        if class_id == NULL_CLASS_ID {
            return Ok(None);
        }

        let id = self.arena.reserve(class_id);
        // Registered before decoding so that references back into this node resolve
        self.slots.insert(slot, id);
        tracing::trace!(slot, id = id.0, "node {class_id:#010x}");
        self.decode_node_into(id)?;
        Ok(Some(id))
    }

    /// Decode a node that is not stored in a reference slot.
    ///
    /// With `class_id` of `None` the class id is read from the stream first.
    pub fn decode_node(&mut self, class_id: Option<u32>) -> Result<Option<NodeId>> {
        let class_id = match class_id {
            Some(id) => id,
            None => self.read_u32()?,
        };
        if class_id == NULL_CLASS_ID {
            return Ok(None);
        }

        let id = self.arena.reserve(class_id);
        self.decode_node_into(id)?;
        Ok(Some(id))
    }

    /// Read chunks into an already reserved node until the end sentinel.
    pub fn decode_node_into(&mut self, id: NodeId) -> Result<()> {
        if self.depth >= self.options.max_node_depth {
            return Err(Error::NestingTooDeep {
                limit: self.options.max_node_depth,
                offset: self.position(),
            });
        }

        // The node is moved out while its chunks run so handlers can hold `&mut Node`
        // and still resolve references through the arena.
        self.depth += 1;
        let mut node = self.arena.take(id);
        let result = self.read_chunks(&mut node);
        self.arena.restore(id, node);
        self.depth -= 1;
        result
    }

    fn read_chunks(&mut self, node: &mut Node) -> Result<()> {
        loop {
            let offset = self.position();
            let chunk_id = self.read_u32()?;
            if chunk_id == NODE_END {
                return Ok(());
            }

            let entry =
                chunk::lookup(chunk_id).ok_or(Error::UnknownChunk { id: chunk_id, offset })?;
            self.dispatch(entry, node)?;
        }
    }

    fn dispatch(&mut self, entry: &ChunkEntry, node: &mut Node) -> Result<()> {
        match entry.kind {
            ChunkKind::Ordinary => {
                tracing::debug!("chunk {:#010x}", entry.id);
                let fields = self.run_handler(entry, node)?;
                node.fields.merge(fields);
            }
            ChunkKind::Skippable => {
                let size = self.read_skip_prefix(entry.id)?;
                tracing::debug!("skipping chunk {:#010x} ({size} bytes)", entry.id);
                self.advance(size)?;
            }
            ChunkKind::ParsableSkippable => {
                let size = self.read_skip_prefix(entry.id)?;
                tracing::debug!("chunk {:#010x} ({size} bytes)", entry.id);
                let start = self.local_position();
                let fields = self.run_handler(entry, node)?;
                let consumed = self.local_position() - start;
                if consumed != size {
                    let err = Error::ChunkSizeMismatch {
                        chunk_id: entry.id,
                        declared: size,
                        consumed,
                        offset: self.position(),
                    };
                    if self.options.strict_chunk_sizes {
                        return Err(err);
                    }
                    tracing::warn!("{err}; resynchronising");
                    self.seek(start + size)?;
                }
                node.fields.merge(fields);
            }
        }
        Ok(())
    }

    fn run_handler(&mut self, entry: &ChunkEntry, node: &mut Node) -> Result<Fields> {
        match entry.handler {
            Some(Handler::Read(f)) => f(self),
            Some(Handler::Mutate(f)) => f(self, node),
            None => Err(self.unsupported(entry.id, "chunk has no reader")),
        }
    }

    fn read_skip_prefix(&mut self, chunk_id: u32) -> Result<usize> {
        let offset = self.position();
        let marker = self.read_u32()?;
        if marker != SKIP_MARKER {
            return Err(Error::MalformedSkip {
                chunk_id,
                marker,
                offset,
            });
        }
        Ok(self.read_u32()? as usize)
    }

    /// Run `f` with a fresh lookback table and reference slot map, restoring the
    /// outer ones afterwards. Nodes still land in the shared arena.
    pub fn encapsulated<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let lookback = std::mem::take(&mut self.lookback);
        let slots = std::mem::take(&mut self.slots);
        let result = f(self);
        self.lookback = lookback;
        self.slots = slots;
        result
    }

    /// Advance until the next four bytes are the node end sentinel, leaving it unread.
    pub fn skip_to_node_end(&mut self) -> Result<()> {
        while self.peek_u32()? != NODE_END {
            self.advance(1)?;
        }
        Ok(())
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub fn unsupported(&self, chunk_id: u32, what: impl Into<String>) -> Error {
        Error::Unsupported {
            chunk_id,
            what: what.into(),
            offset: self.position(),
        }
    }

    /// Read a `u32` version and fail if it exceeds `max`.
    pub fn read_version(&mut self, chunk_id: u32, max: u32) -> Result<u32> {
        let offset = self.position();
        let version = self.read_u32()?;
        if version > max {
            return Err(Error::UnsupportedVersion {
                chunk_id,
                version: version as i64,
                offset,
            });
        }
        Ok(version)
    }

    /// Error for a version that was already read
    pub fn bad_version(&self, chunk_id: u32, version: impl Into<i64>) -> Error {
        Error::UnsupportedVersion {
            chunk_id,
            version: version.into(),
            offset: self.position(),
        }
    }
}

impl<'a> Deref for Reader<'a> {
    type Target = Cursor<'a>;

    fn deref(&self) -> &Cursor<'a> {
        &self.cursor
    }
}

impl DerefMut for Reader<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cursor
    }
}
