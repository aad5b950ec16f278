//! CGameCtnAnchoredObject: an item placed freely in a map

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::Fields;
use crate::reader::Reader;

pub const CLASS_ID: u32 = 0x0310_1000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::read(0x0310_1002, read_placement),
    ChunkEntry::skip(0x0310_1004),
    ChunkEntry::skip(0x0310_1005),
];

/// Placement flag: a pack descriptor follows the scale
const FLAG_PACK_DESC: i16 = 4;

fn read_placement(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_version(0x0310_1002, 8)?;

    let mut fields = Fields::new()
        .with("version", version)
        .with("itemModel", r.read_meta()?)
        .with("pitchYawRoll", r.read_vec3()?)
        .with("blockUnitCoord", r.read_byte3()?)
        .with("anchorTreeId", r.read_lookback()?)
        .with("absolutePositionInMap", r.read_vec3()?)
        .with("waypointSpecialProperty", r.decode_node(None)?);

    if version < 5 {
        r.advance(4)?;
    }
    if version >= 4 {
        let flags = r.read_i16()?;
        fields.insert("flags", flags);

        if version >= 5 {
            fields.insert("pivotPosition", r.read_vec3()?);
        }
        if version >= 6 {
            fields.insert("scale", r.read_f32()?);
        }
        if version >= 7 && flags & FLAG_PACK_DESC != 0 {
            fields.insert("packDesc", r.read_file_ref()?);
        }
        if version >= 8 {
            r.advance(24)?;
        }
    }
    Ok(fields)
}
