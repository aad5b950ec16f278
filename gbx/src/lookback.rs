//! Lookback string table
//!
//! Identifiers in GBX files are interned per session: the first occurrence is
//! written in full and appended to the table, later occurrences are 1-based
//! back-references. A small set of well-known names is referenced by numeric
//! collection id instead.

use crate::collections::collection_name;
use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Value for an empty lookback string
pub const LOOKBACK_EMPTY: u32 = 0xFFFF_FFFF;

/// Mask that strips the two flag bits from a lookback value
pub const LOOKBACK_INDEX_MASK: u32 = 0x3FFF_FFFF;

const LOOKBACK_FLAGS: u32 = 0xC000_0000;

/// Session-scoped interned string table
#[derive(Debug, Clone, Default)]
pub struct LookbackTable {
    /// Whether the 4-byte version marker has been consumed
    seen: bool,
    strings: Vec<String>,
}

impl LookbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Forget all stored strings; the next read consumes a fresh version marker.
    pub fn reset(&mut self) {
        if self.seen {
            self.strings.clear();
            self.seen = false;
        }
    }

    /// Read one lookback string.
    ///
    /// `disallow_collection` renders a bare numeric value as its decimal string
    /// instead of resolving it through the collection table.
    pub fn read(&mut self, cursor: &mut Cursor<'_>, disallow_collection: bool) -> Result<String> {
        if !self.seen {
            cursor.advance(4)?;
            self.seen = true;
            self.strings.clear();
        }

        let offset = cursor.position();
        let value = cursor.read_u32()?;

        if value == 0 {
            return Ok(String::new());
        }

        if value & LOOKBACK_FLAGS != 0 && value & LOOKBACK_INDEX_MASK == 0 {
            let s = cursor.read_string()?;
            self.strings.push(s.clone());
            return Ok(s);
        }

        if value == LOOKBACK_EMPTY {
            return Ok(String::new());
        }

        if disallow_collection {
            return Ok(value.to_string());
        }

        if value & LOOKBACK_INDEX_MASK == value {
            return collection_name(value)
                .map(str::to_owned)
                .ok_or(Error::UnknownCollectionId { id: value, offset });
        }

        let index = value & LOOKBACK_INDEX_MASK;
        self.strings
            .get(index as usize - 1)
            .cloned()
            .ok_or(Error::LookbackIndexOutOfRange {
                index,
                len: self.strings.len(),
                offset,
            })
    }

    /// Read an (id, collection, author) triple.
    pub fn read_meta(&mut self, cursor: &mut Cursor<'_>) -> Result<Meta> {
        Ok(Meta {
            id: self.read(cursor, false)?,
            collection: self.read(cursor, false)?,
            author: self.read(cursor, false)?,
        })
    }
}

/// Identifier triple naming a block, item, vehicle or map
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Meta {
    pub id: String,
    pub collection: String,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_string(s: &str) -> Vec<u8> {
        let mut out = 0x4000_0000u32.to_le_bytes().to_vec();
        out.extend_from_slice(&(s.len() as i32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_new_string_then_back_reference() {
        let mut data = 3u32.to_le_bytes().to_vec(); // version marker
        data.extend(new_string("Stadium2020"));
        data.extend_from_slice(&0x4000_0001u32.to_le_bytes());

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        assert_eq!(table.read(&mut c, false).unwrap(), "Stadium2020");
        assert_eq!(table.read(&mut c, false).unwrap(), "Stadium2020");
        assert_eq!(table.len(), 1);
        assert!(c.is_empty());
    }

    #[test]
    fn test_empty_values() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&LOOKBACK_EMPTY.to_le_bytes());

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        assert_eq!(table.read(&mut c, false).unwrap(), "");
        assert_eq!(table.read(&mut c, false).unwrap(), "");
        assert!(table.is_empty());
    }

    #[test]
    fn test_collection_ids() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(&26u32.to_le_bytes());
        data.extend_from_slice(&26u32.to_le_bytes());
        data.extend_from_slice(&9999u32.to_le_bytes());

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        assert_eq!(table.read(&mut c, false).unwrap(), "Stadium");
        assert_eq!(table.read(&mut c, true).unwrap(), "26");
        assert!(matches!(
            table.read(&mut c, false),
            Err(Error::UnknownCollectionId { id: 9999, offset: 12 })
        ));
    }

    #[test]
    fn test_back_reference_out_of_range() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend(new_string("a"));
        data.extend_from_slice(&0x4000_0002u32.to_le_bytes());

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        table.read(&mut c, false).unwrap();
        assert!(matches!(
            table.read(&mut c, false),
            Err(Error::LookbackIndexOutOfRange { index: 2, len: 1, .. })
        ));
    }

    #[test]
    fn test_reset_reads_new_marker() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend(new_string("first"));
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(&0x4000_0001u32.to_le_bytes());

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        table.read(&mut c, false).unwrap();
        table.reset();
        assert!(table.is_empty());
        // The back-reference now points into an empty table
        assert!(matches!(
            table.read(&mut c, false),
            Err(Error::LookbackIndexOutOfRange { index: 1, len: 0, .. })
        ));
    }

    #[test]
    fn test_either_flag_bit_starts_new_string() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(&0x8000_0000u32.to_le_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.push(b'x');

        let mut table = LookbackTable::new();
        let mut c = Cursor::new(&data);
        assert_eq!(table.read(&mut c, false).unwrap(), "x");
    }
}
