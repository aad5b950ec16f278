//! GBX header
//!
//! The header carries the container version, compression flags, the class id of the
//! body's root node and a table of "user data" chunks that describe the file without
//! decoding the body (map times, thumbnail, author).

use serde::Serialize;

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::lookback::{LookbackTable, Meta};
use crate::{GBX_MAGIC, MIN_GBX_VERSION};

/// Byte value marking a compressed section
const COMPRESSED: u8 = b'C';

/// High bit of a header chunk size marks a "heavy" chunk
const HEAVY_FLAG: u32 = 0x8000_0000;

pub const CHUNK_MAP_TIMES: u32 = 0x0304_3002;
pub const CHUNK_MAP_COMMON: u32 = 0x0304_3003;
pub const CHUNK_MAP_VERSION: u32 = 0x0304_3004;
pub const CHUNK_MAP_XML: u32 = 0x0304_3005;
pub const CHUNK_MAP_THUMBNAIL: u32 = 0x0304_3007;
pub const CHUNK_MAP_AUTHOR: u32 = 0x0304_3008;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: u16,
    pub format: u8,
    pub table_compressed: bool,
    pub body_compressed: bool,
    /// Class of the body's root node
    pub class_id: u32,
    pub chunks: Vec<HeaderChunk>,
    pub num_nodes: u32,
}

impl Header {
    /// Map name from the common info chunk, if present
    pub fn map_name(&self) -> Option<&str> {
        self.chunks.iter().find_map(|c| match c {
            HeaderChunk::CommonInfo(info) => Some(info.name.as_str()),
            _ => None,
        })
    }

    pub fn times(&self) -> Option<&MapTimes> {
        self.chunks.iter().find_map(|c| match c {
            HeaderChunk::Times(times) => Some(times),
            _ => None,
        })
    }
}

/// One decoded header chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderChunk {
    Times(MapTimes),
    CommonInfo(CommonInfo),
    Version { version: u8 },
    Xml { xml: String },
    Thumbnail(Thumbnail),
    Author(AuthorInfo),
    /// Chunk with no decoder; only its id and size are kept
    Skipped { id: u32, size: u32 },
}

impl HeaderChunk {
    pub fn id(&self) -> u32 {
        match self {
            Self::Times(_) => CHUNK_MAP_TIMES,
            Self::CommonInfo(_) => CHUNK_MAP_COMMON,
            Self::Version { .. } => CHUNK_MAP_VERSION,
            Self::Xml { .. } => CHUNK_MAP_XML,
            Self::Thumbnail(_) => CHUNK_MAP_THUMBNAIL,
            Self::Author(_) => CHUNK_MAP_AUTHOR,
            Self::Skipped { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorMode {
    Simple,
    Advanced,
}

/// Medal times and race settings (0x03043002)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapTimes {
    pub version: u8,
    pub map_info: Option<Meta>,
    pub map_name: Option<String>,
    pub locked: u32,
    pub bronze_time: Option<u32>,
    pub silver_time: Option<u32>,
    pub gold_time: Option<u32>,
    pub author_time: Option<u32>,
    pub cost: Option<u32>,
    pub is_lap_race: Option<bool>,
    pub play_mode: Option<u32>,
    pub author_score: Option<u32>,
    pub editor: Option<EditorMode>,
    pub checkpoints: Option<u32>,
    pub laps: Option<u32>,
}

/// Identity and environment of a map (0x03043003)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonInfo {
    pub version: u8,
    pub uid: String,
    pub environment: String,
    pub author_login: String,
    pub name: String,
    pub kind: u8,
    pub locked: Option<u32>,
    pub password: Option<String>,
    pub decoration: Option<Meta>,
    pub map_origin: Option<crate::types::Vec2>,
    pub map_target: Option<crate::types::Vec2>,
    pub map_type: Option<String>,
    pub map_style: Option<String>,
    pub lightmap_cache_uid: Option<u64>,
    pub lightmap_version: Option<u8>,
    pub title_id: Option<String>,
}

/// Thumbnail JPEG and map comment (0x03043007)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Thumbnail {
    pub thumbnail: Option<Vec<u8>>,
    pub comment: String,
}

/// Author identity (0x03043008)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorInfo {
    pub version: u32,
    pub author_version: u32,
    pub login: String,
    pub nickname: String,
    pub zone: String,
    pub extra: String,
}

/// Read the header up to and including the node count
///
/// # Arguments
/// * `cursor` - Cursor positioned at the start of the file
/// * `lookback` - Session lookback table; reset after every header chunk
pub fn read_header(cursor: &mut Cursor<'_>, lookback: &mut LookbackTable) -> Result<Header> {
    let magic = cursor.read_bytes(3)?;
    if magic != GBX_MAGIC {
        return Err(Error::InvalidMagic { offset: 0 });
    }

    let version = cursor.read_u16()?;
    if version < MIN_GBX_VERSION {
        return Err(Error::UnsupportedGbxVersion(version));
    }

    let format = cursor.read_u8()?;
    let table_compressed = cursor.read_u8()? == COMPRESSED;
    let body_compressed = cursor.read_u8()? == COMPRESSED;
    cursor.advance(1)?; // reserved

    let class_id = cursor.read_u32()?;
    let user_data_size = cursor.read_u32()?;

    let mut chunks = Vec::new();
    if user_data_size > 0 {
        let num_chunks = cursor.read_u32()?;
        let mut table = Vec::new();
        for _ in 0..num_chunks {
            let id = cursor.read_u32()?;
            let size = cursor.read_u32()? & !HEAVY_FLAG;
            table.push((id, size));
        }

        for (id, size) in table {
            let mut sub = cursor.sub_cursor(size as usize)?;
            let chunk = read_header_chunk(&mut sub, lookback, id, size)?;
            tracing::debug!("header chunk {id:#010x} ({size} bytes)");
            lookback.reset();
            chunks.push(chunk);
        }
    }

    let num_nodes = cursor.read_u32()?;

    Ok(Header {
        version,
        format,
        table_compressed,
        body_compressed,
        class_id,
        chunks,
        num_nodes,
    })
}

/// Decode one header chunk from a cursor bounded to its declared size.
///
/// Bytes the decoder does not read are ignored.
fn read_header_chunk(
    c: &mut Cursor<'_>,
    lookback: &mut LookbackTable,
    id: u32,
    size: u32,
) -> Result<HeaderChunk> {
    let chunk = match id {
        CHUNK_MAP_TIMES => HeaderChunk::Times(read_times(c, lookback)?),
        CHUNK_MAP_COMMON => HeaderChunk::CommonInfo(read_common_info(c, lookback)?),
        CHUNK_MAP_VERSION => HeaderChunk::Version {
            version: c.read_u8()?,
        },
        CHUNK_MAP_XML => HeaderChunk::Xml {
            xml: c.read_string()?,
        },
        CHUNK_MAP_THUMBNAIL => HeaderChunk::Thumbnail(read_thumbnail(c)?),
        CHUNK_MAP_AUTHOR => HeaderChunk::Author(AuthorInfo {
            version: c.read_u32()?,
            author_version: c.read_u32()?,
            login: c.read_string()?,
            nickname: c.read_string()?,
            zone: c.read_string()?,
            extra: c.read_string()?,
        }),
        _ => HeaderChunk::Skipped { id, size },
    };
    Ok(chunk)
}

fn read_times(c: &mut Cursor<'_>, lookback: &mut LookbackTable) -> Result<MapTimes> {
    let offset = c.position();
    let version = c.read_u8()?;
    if version > 13 {
        return Err(Error::UnsupportedVersion {
            chunk_id: CHUNK_MAP_TIMES,
            version: version as i64,
            offset,
        });
    }

    let mut t = MapTimes {
        version,
        ..Default::default()
    };

    if version < 3 {
        t.map_info = Some(lookback.read_meta(c)?);
        t.map_name = Some(c.read_string()?);
    }

    t.locked = c.read_u32()?;

    if version >= 1 {
        t.bronze_time = Some(c.read_u32()?);
        t.silver_time = Some(c.read_u32()?);
        t.gold_time = Some(c.read_u32()?);
        t.author_time = Some(c.read_u32()?);
    }
    if version == 2 {
        c.advance(1)?;
    }
    if version >= 4 {
        t.cost = Some(c.read_u32()?);
    }
    if version >= 5 {
        t.is_lap_race = Some(c.read_bool()?);
    }
    if version == 6 {
        c.read_bool()?;
    }
    if version >= 7 {
        t.play_mode = Some(c.read_u32()?);
    }
    if version >= 9 {
        c.advance(4)?;
    }
    if version >= 10 {
        t.author_score = Some(c.read_u32()?);
    }
    if version >= 11 {
        t.editor = Some(if c.read_u32()? == 1 {
            EditorMode::Simple
        } else {
            EditorMode::Advanced
        });
    }
    if version >= 12 {
        c.advance(4)?;
    }
    if version >= 13 {
        t.checkpoints = Some(c.read_u32()?);
        t.laps = Some(c.read_u32()?);
    }

    Ok(t)
}

fn read_common_info(c: &mut Cursor<'_>, lookback: &mut LookbackTable) -> Result<CommonInfo> {
    let version = c.read_u8()?;
    let map = lookback.read_meta(c)?;
    let name = c.read_string()?;
    let kind = c.read_u8()?;

    let mut info = CommonInfo {
        version,
        uid: map.id,
        environment: map.collection,
        author_login: map.author,
        name,
        kind,
        ..Default::default()
    };

    if version >= 1 {
        info.locked = Some(c.read_u32()?);
        info.password = Some(c.read_string()?);
    }
    if version >= 2 {
        info.decoration = Some(lookback.read_meta(c)?);
    }
    if version >= 3 {
        info.map_origin = Some(c.read_vec2()?);
    }
    if version >= 4 {
        info.map_target = Some(c.read_vec2()?);
    }
    if version >= 5 {
        c.advance(16)?;
    }
    if version >= 6 {
        info.map_type = Some(c.read_string()?);
        info.map_style = Some(c.read_string()?);
        info.lightmap_cache_uid = Some(c.read_u64()?);
    }
    if version >= 9 {
        info.lightmap_version = Some(c.read_u8()?);
    }
    if version >= 11 {
        info.title_id = Some(lookback.read(c, false)?);
    }

    Ok(info)
}

fn read_thumbnail(c: &mut Cursor<'_>) -> Result<Thumbnail> {
    if c.read_u32()? != 1 {
        return Ok(Thumbnail::default());
    }

    let thumbnail_size = c.read_u32()? as usize;
    c.advance("<Thumbnail.jpg>".len())?;
    let thumbnail = c.read_bytes(thumbnail_size)?.to_vec();
    c.advance("</Thumbnail.jpg>".len())?;
    c.advance("<Comments>".len())?;
    let comment_size = c.read_u32()? as usize;
    let comment = c.read_fixed_string(comment_size)?;
    c.advance("</Comments>".len())?;

    Ok(Thumbnail {
        thumbnail: Some(thumbnail),
        comment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_prefix(version: u16, body: u8) -> Vec<u8> {
        let mut data = b"GBX".to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&[b'B', b'U', body, b'R']);
        data.extend_from_slice(&0x0304_3000u32.to_le_bytes());
        data
    }

    #[test]
    fn test_invalid_magic() {
        let data = b"GBY\x06\x00BUCR";
        let result = read_header(&mut Cursor::new(data), &mut LookbackTable::new());
        assert!(matches!(result, Err(Error::InvalidMagic { offset: 0 })));
    }

    #[test]
    fn test_old_version_rejected() {
        let data = header_prefix(5, b'U');
        let result = read_header(&mut Cursor::new(&data), &mut LookbackTable::new());
        assert!(matches!(result, Err(Error::UnsupportedGbxVersion(5))));
    }

    #[test]
    fn test_no_user_data() {
        let mut data = header_prefix(6, b'C');
        data.extend_from_slice(&0u32.to_le_bytes()); // user data size
        data.extend_from_slice(&7u32.to_le_bytes()); // num nodes

        let mut c = Cursor::new(&data);
        let header = read_header(&mut c, &mut LookbackTable::new()).unwrap();
        assert!(header.body_compressed);
        assert!(!header.table_compressed);
        assert_eq!(header.class_id, 0x0304_3000);
        assert_eq!(header.num_nodes, 7);
        assert!(header.chunks.is_empty());
        assert!(c.is_empty());
    }

    #[test]
    fn test_unknown_and_short_chunks_advance_by_declared_size() {
        let mut payload_version = vec![5u8, 0xAA, 0xBB]; // version chunk with trailing bytes
        let payload_unknown = vec![1u8, 2, 3, 4, 5];

        let mut data = header_prefix(6, b'U');
        let user_data_size = 4 + 16 + payload_version.len() + payload_unknown.len();
        data.extend_from_slice(&(user_data_size as u32).to_le_bytes());
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&CHUNK_MAP_VERSION.to_le_bytes());
        data.extend_from_slice(&(payload_version.len() as u32).to_le_bytes());
        data.extend_from_slice(&0x0304_3099u32.to_le_bytes());
        data.extend_from_slice(&(payload_unknown.len() as u32 | HEAVY_FLAG).to_le_bytes());
        data.append(&mut payload_version);
        data.extend_from_slice(&payload_unknown);
        data.extend_from_slice(&1u32.to_le_bytes());

        let header = read_header(&mut Cursor::new(&data), &mut LookbackTable::new()).unwrap();
        assert_eq!(header.chunks[0], HeaderChunk::Version { version: 5 });
        assert_eq!(
            header.chunks[1],
            HeaderChunk::Skipped {
                id: 0x0304_3099,
                size: 5
            }
        );
        assert_eq!(header.num_nodes, 1);
    }

    #[test]
    fn test_times_v13() {
        let mut payload = vec![13u8];
        for v in [0u32, 40000, 30000, 25000, 20000, 0] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        payload.extend_from_slice(&1u32.to_le_bytes()); // lap race
        for v in [5u32, 0, 20000, 0, 0, 3, 2] {
            payload.extend_from_slice(&v.to_le_bytes());
        }

        let times = read_times(&mut Cursor::new(&payload), &mut LookbackTable::new()).unwrap();
        assert_eq!(times.author_time, Some(20000));
        assert_eq!(times.is_lap_race, Some(true));
        assert_eq!(times.play_mode, Some(5));
        assert_eq!(times.author_score, Some(20000));
        assert_eq!(times.editor, Some(EditorMode::Advanced));
        assert_eq!(times.checkpoints, Some(3));
        assert_eq!(times.laps, Some(2));
    }

    #[test]
    fn test_times_future_version() {
        let payload = [14u8, 0, 0, 0, 0];
        let result = read_times(&mut Cursor::new(&payload), &mut LookbackTable::new());
        assert!(matches!(
            result,
            Err(Error::UnsupportedVersion {
                chunk_id: CHUNK_MAP_TIMES,
                version: 14,
                ..
            })
        ));
    }

    #[test]
    fn test_thumbnail_and_comment() {
        let mut payload = 1u32.to_le_bytes().to_vec();
        payload.extend_from_slice(&3u32.to_le_bytes());
        payload.extend_from_slice(b"<Thumbnail.jpg>");
        payload.extend_from_slice(&[0xFF, 0xD8, 0xFF]);
        payload.extend_from_slice(b"</Thumbnail.jpg>");
        payload.extend_from_slice(b"<Comments>");
        payload.extend_from_slice(&2u32.to_le_bytes());
        payload.extend_from_slice(b"hi");
        payload.extend_from_slice(b"</Comments>");

        let mut c = Cursor::new(&payload);
        let thumb = read_thumbnail(&mut c).unwrap();
        assert_eq!(thumb.thumbnail, Some(vec![0xFF, 0xD8, 0xFF]));
        assert_eq!(thumb.comment, "hi");
        assert!(c.is_empty());
    }
}
