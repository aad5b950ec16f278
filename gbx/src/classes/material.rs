//! CPlugMaterialUserInst: per-item material overrides

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::Fields;
use crate::reader::Reader;

pub const CLASS_ID: u32 = 0x090F_D000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::read(0x090F_D000, read_material),
    ChunkEntry::read(0x090F_D001, read_tiling),
    ChunkEntry::read(0x090F_D002, read_version_pair),
];

fn read_material(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let mut fields = Fields::new();

    let uses_game_material = version >= 11 && r.read_bool_u8()?;
    if version >= 11 {
        fields.insert("isUsingGameMaterial", uses_game_material);
    }
    fields.insert("model", r.read_lookback()?);
    fields.insert("baseTexture", r.read_string()?);
    fields.insert("surfacePhysicId", r.read_u8()?);
    if version >= 10 {
        fields.insert("surfaceGameplayId", r.read_u8()?);
    }

    if version < 1 {
        return Ok(fields);
    }

    let link = if (9..11).contains(&version) || uses_game_material {
        r.read_string()?
    } else {
        r.read_lookback()?
    };
    fields.insert("link", link);

    if version < 2 {
        return Ok(fields);
    }
    r.read_list(|r| {
        r.read_lookback()?;
        r.read_lookback()?;
        r.read_i32()
    })?;
    r.read_list(|r| r.read_i32())?;

    if version < 3 {
        return Ok(fields);
    }
    r.read_list(|r| {
        r.read_lookback()?;
        r.read_lookback()?;
        r.read_f32()?;
        r.advance(8)
    })?;

    if version < 4 {
        return Ok(fields);
    }
    r.read_list(|r| r.read_lookback())?;

    if version >= 6 {
        let textures = r.read_list(|r| {
            Ok(Fields::new()
                .with("index", r.read_i32()?)
                .with("texture", r.read_string()?))
        })?;
        fields.insert("userTextures", textures);
        if version >= 7 {
            fields.insert("hidingGroup", r.read_lookback()?);
        }
    }
    Ok(fields)
}

fn read_tiling(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x090F_D001;
    let version = r.read_i32()?;
    r.read_node_ref()?;
    if version == 2 {
        return Err(r.bad_version(ID, version));
    }

    let mut fields = Fields::new();
    if version >= 3 {
        fields.insert("tilingU", r.read_i32()?);
        fields.insert("tilingV", r.read_i32()?);
        fields.insert("textureSizeInMeters", r.read_f32()?);
        if version >= 4 {
            r.advance(4)?;
            if version >= 5 {
                fields.insert("isNatural", r.read_bool()?);
            }
        }
    }
    Ok(fields)
}

fn read_version_pair(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(8)?;
    Ok(Fields::new())
}
