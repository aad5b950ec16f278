//! CGameCtnMacroBlockInfo: a reusable group of blocks and items

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::Fields;
use crate::reader::Reader;

pub const CLASS_ID: u32 = 0x0310_D000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::read(0x0310_D000, read_block_spawns),
    ChunkEntry::read(0x0310_D001, read_skin_spawns),
    ChunkEntry::read(0x0310_D002, read_card_events),
    ChunkEntry::read(0x0310_D006, read_opaque),
    ChunkEntry::read(0x0310_D007, read_unused_refs),
    ChunkEntry::read(0x0310_D008, read_auto_terrains),
    ChunkEntry::read(0x0310_D00E, read_object_spawns),
    ChunkEntry::read(0x0310_D00F, read_bounds),
];

/// Block spawn flag: free placement with an absolute position
const FLAG_FREE_PLACEMENT: u32 = 1 << 26;

fn read_block_spawns(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0310_D000;
    let spawns = r.read_list(|r| {
        let version = r.read_u32()?;
        let mut spawn = Fields::new()
            .with("version", version)
            .with("blockModel", r.read_meta()?);

        if version < 2 {
            return Err(r.bad_version(ID, version));
        }
        if version < 5 {
            spawn.insert("coord", r.read_byte3()?);
            spawn.insert("direction", r.read_u8()?);
        }

        let flags = r.read_u32()?;
        spawn.insert("flags", flags);

        if version >= 3 {
            if version >= 5 {
                if flags & FLAG_FREE_PLACEMENT != 0 {
                    spawn.insert("absolutePositionInMap", r.read_vec3()?);
                    spawn.insert("pitchYawRoll", r.read_vec3()?);
                } else {
                    spawn.insert("coord", r.read_byte3()?);
                    spawn.insert("direction", r.read_u8()?);
                }
            }

            spawn.insert("waypoint", r.read_node_ref()?);

            if version >= 4 {
                if (6..8).contains(&version) {
                    return Err(r.bad_version(ID, version));
                }
                if version < 6 && r.read_node_ref()?.is_some() {
                    return Err(r.unsupported(ID, "block spawn with an attached node"));
                }
                if version >= 8 {
                    r.advance(2)?;
                }
            }
        }
        Ok(spawn)
    })?;

    Ok(Fields::new().with("blockSpawns", spawns))
}

fn read_skin_spawns(r: &mut Reader<'_>) -> Result<Fields> {
    let spawns = r.read_list(|r| {
        let version = r.read_u32()?;
        let skin = r.read_node_ref()?;
        if version == 0 {
            r.read_int3()?;
        }
        Ok(Fields::new()
            .with("version", version)
            .with("skin", skin)
            .with("blockSpawnIndex", r.read_u32()?))
    })?;
    Ok(Fields::new().with("blockSkinSpawns", spawns))
}

fn read_card_events(r: &mut Reader<'_>) -> Result<Fields> {
    let spawns = r.read_list(|r| {
        let version = r.read_u32()?;
        r.read_list(|r| r.read_meta())?;
        r.read_int3()?;
        Ok(Fields::new().with("version", version))
    })?;
    Ok(Fields::new().with("cardEventsSpawns", spawns))
}

fn read_opaque(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    let size = r.read_u32()? as usize;
    r.advance(size)?;
    Ok(Fields::new())
}

fn read_unused_refs(r: &mut Reader<'_>) -> Result<Fields> {
    r.read_node_ref_list()?;
    Ok(Fields::new())
}

fn read_auto_terrains(r: &mut Reader<'_>) -> Result<Fields> {
    let list_version = r.read_u32()?;
    let terrains = r.read_node_ref_list()?;
    r.advance(4)?;
    r.read_bool()?;
    Ok(Fields::new()
        .with("listVersion", list_version)
        .with("autoTerrains", terrains))
}

fn read_object_spawns(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0310_D00E;
    let version = r.read_u32()?;

    let spawns = r.read_list(|r| {
        let ver = r.read_u32()?;
        let mut spawn = Fields::new()
            .with("ver", ver)
            .with("itemModel", r.read_meta()?);

        if ver < 3 {
            spawn.insert("quarterY", r.read_u8()?);
            if ver >= 1 {
                spawn.insert("additionalDir", r.read_u8()?);
            }
        } else {
            spawn.insert("pitchYawRoll", r.read_vec3()?);
        }

        spawn.insert("blockCoord", r.read_int3()?);
        spawn.insert("anchorTreeId", r.read_lookback()?);
        spawn.insert("absolutePositionInMap", r.read_vec3()?);

        if ver < 5 {
            r.advance(4)?;
        }
        if ver < 6 {
            r.advance(4)?;
        }
        if ver >= 6 {
            r.advance(2)?;
        }
        if ver >= 7 {
            spawn.insert("pivotPosition", r.read_vec3()?);
        }
        if ver >= 8 {
            spawn.insert("waypointSpecialProperty", r.read_node_ref()?);
        }
        if ver >= 9 {
            spawn.insert("scale", r.read_f32()?);
        }
        if ver >= 10 {
            r.read_int3()?;
        }
        if (11..14).contains(&ver) {
            return Err(r.bad_version(ID, ver));
        }
        if ver >= 14 {
            r.advance(4)?;
            if r.read_u8()? == 1 {
                spawn.insert("packDesc", r.read_file_ref()?);
                spawn.insert("foregroundPackDesc", r.read_file_ref()?);
            }
            let marker = r.read_i32()?;
            if marker != -1 {
                return Err(r.unsupported(ID, format!("object spawn trailer {marker}")));
            }
        }
        Ok(spawn)
    })?;

    if (1..3).contains(&version) {
        r.read_list(|r| r.read_int2())?;
    }
    if version >= 3 {
        r.read_list(|r| r.read_int4())?;
    }

    Ok(Fields::new()
        .with("version", version)
        .with("objectSpawns", spawns))
}

fn read_bounds(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    r.read_int3()?;
    r.read_int3()?;
    r.read_list(|r| r.read_int3())?;
    Ok(Fields::new().with("version", version))
}
