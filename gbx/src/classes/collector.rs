//! Small map-side classes: collector lists, block skins, challenge parameters,
//! waypoint properties, zone genealogies and auto terrain.

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::Fields;
use crate::reader::Reader;

pub const COLLECTOR_LIST_CLASS_ID: u32 = 0x0301_B000;
pub const CHALLENGE_PARAMETERS_CLASS_ID: u32 = 0x0305_B000;

pub const CHUNKS: &[ChunkEntry] = &[
    // CGameCtnCollectorList
    ChunkEntry::read(0x0301_B000, read_collector_list),
    // CGameCtnBlockSkin
    ChunkEntry::read(0x0305_9000, read_skin_text),
    ChunkEntry::read(0x0305_9001, read_skin_pack),
    ChunkEntry::read(0x0305_9002, read_skin_parent_pack),
    ChunkEntry::read(0x0305_9003, read_skin_secondary_pack),
    // CGameCtnChallengeParameters
    ChunkEntry::read(0x0305_B001, read_tips),
    ChunkEntry::read(0x0305_B004, read_medal_times),
    ChunkEntry::read(0x0305_B008, read_time_limit),
    ChunkEntry::skip(0x0305_B00A),
    ChunkEntry::read(0x0305_B00D, read_validation_ghost),
    ChunkEntry::skip(0x0305_B00E),
    // CGameWaypointSpecialProperty, under both class ids
    ChunkEntry::read(0x0313_B000, read_waypoint),
    ChunkEntry::read(0x2E00_9000, read_waypoint),
    // CGameCtnZoneGenealogy
    ChunkEntry::read(0x0311_D002, read_genealogy),
    // CGameCtnAutoTerrain
    ChunkEntry::read(0x0312_0001, read_auto_terrain),
];

fn read_collector_list(r: &mut Reader<'_>) -> Result<Fields> {
    let list = r.read_list(|r| {
        let meta = r.read_meta()?;
        Ok(Fields::new()
            .with("blockName", meta.id)
            .with("collection", meta.collection)
            .with("author", meta.author)
            .with("numPieces", r.read_u32()?))
    })?;
    Ok(Fields::new().with("collectorList", list))
}

fn read_skin_text(r: &mut Reader<'_>) -> Result<Fields> {
    let text = r.read_string()?;
    r.read_string()?;
    Ok(Fields::new().with("text", text))
}

fn read_skin_pack(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("text", r.read_string()?)
        .with("packDesc", r.read_file_ref()?))
}

fn read_skin_parent_pack(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("text", r.read_string()?)
        .with("packDesc", r.read_file_ref()?)
        .with("parentPackDesc", r.read_file_ref()?))
}

fn read_skin_secondary_pack(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("version", r.read_u32()?)
        .with("secondaryPackDesc", r.read_file_ref()?))
}

fn read_tips(r: &mut Reader<'_>) -> Result<Fields> {
    for _ in 0..4 {
        r.read_string()?;
    }
    Ok(Fields::new())
}

fn read_medal_times(r: &mut Reader<'_>) -> Result<Fields> {
    let fields = Fields::new()
        .with("bronzeTime", r.read_u32()?)
        .with("silverTime", r.read_u32()?)
        .with("goldTime", r.read_u32()?)
        .with("authorTime", r.read_u32()?);
    r.advance(4)?;
    Ok(fields)
}

fn read_time_limit(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("timeLimit", r.read_u32()?)
        .with("authorScore", r.read_u32()?))
}

fn read_validation_ghost(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("raceValidateGhost", r.read_node_ref()?))
}

fn read_waypoint(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0313_B000;
    let version = r.read_u32()?;
    match version {
        1 => Ok(Fields::new()
            .with("version", version)
            .with("spawn", r.read_u32()?)
            .with("order", r.read_u32()?)),
        2 => Ok(Fields::new()
            .with("version", version)
            .with("tag", r.read_string()?)
            .with("order", r.read_u32()?)),
        _ => Err(r.bad_version(ID, version)),
    }
}

fn read_genealogy(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("zoneIds", r.read_list(|r| r.read_lookback())?)
        .with("currentIndex", r.read_u32()?)
        .with("dir", r.read_u32()?)
        .with("currentZoneId", r.read_lookback()?))
}

fn read_auto_terrain(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("offset", r.read_int3()?)
        .with("genealogy", r.read_node_ref()?))
}
