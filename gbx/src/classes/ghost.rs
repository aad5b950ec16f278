//! CGameCtnGhost and its base class CGameGhost

use crate::chunk::ChunkEntry;
use crate::compression::{Codec, read_compressed_block};
use crate::cursor::Cursor;
use crate::error::Result;
use crate::node::{Fields, Node, Value};
use crate::reader::Reader;
use crate::NULL_CLASS_ID;

pub const CLASS_ID: u32 = 0x0309_2000;
pub const GAME_GHOST_CLASS_ID: u32 = 0x0303_F000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::skippable(0x0309_2000, read_ghost),
    ChunkEntry::skippable(0x0309_2005, read_race_time),
    ChunkEntry::skippable(0x0309_2008, read_respawns),
    ChunkEntry::skippable(0x0309_2009, read_trail_color),
    ChunkEntry::skippable(0x0309_200A, read_stunts_score),
    ChunkEntry::skippable(0x0309_200B, read_checkpoints),
    ChunkEntry::read(0x0309_200C, skip_u32),
    ChunkEntry::read(0x0309_200E, read_uid),
    ChunkEntry::read(0x0309_200F, read_login),
    ChunkEntry::read(0x0309_2010, read_unused_lookback),
    ChunkEntry::mutate(0x0309_2011, read_validation),
    ChunkEntry::read(0x0309_2012, skip_20),
    ChunkEntry::skip(0x0309_2013),
    ChunkEntry::skippable(0x0309_2014, skip_u32),
    ChunkEntry::read(0x0309_2015, read_player_mobil),
    ChunkEntry::skippable(0x0309_2017, read_skins),
    ChunkEntry::read(0x0309_2018, read_unused_meta),
    ChunkEntry::mutate(0x0309_2019, read_validation_tail),
    ChunkEntry::skip(0x0309_201B),
    ChunkEntry::skippable(0x0309_201C, skip_32),
    ChunkEntry::skippable(0x0309_201D, read_player_inputs),
    ChunkEntry::mutate(0x0309_2025, read_validation_versioned),
    ChunkEntry::skip(0x0309_2026),
    ChunkEntry::skip(0x0309_2027),
    ChunkEntry::skip(0x0309_2028),
    ChunkEntry::skip(0x0309_2029),
    ChunkEntry::skip(0x0309_202A),
    // CGameGhost
    ChunkEntry::read(0x0303_F005, read_sample_data),
    ChunkEntry::read(0x0303_F006, read_replaying_sample_data),
    ChunkEntry::skip(0x0303_F007),
];

/// Node field set by chunk 0x03092025, read by the validation chunks it wraps
const IS_025_VER1: &str = "is025Ver1";

fn skip_u32(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new())
}

fn skip_20(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(20)?;
    Ok(Fields::new())
}

fn skip_32(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(32)?;
    Ok(Fields::new())
}

fn read_ghost(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0309_2000;
    let version = r.read_version(ID, 8)?;

    let mut fields = Fields::new()
        .with("version", version)
        .with("playerModel", r.read_meta()?)
        .with("lightTrailColor", r.read_color()?)
        .with("skinPackDescs", r.read_list(|r| r.read_file_ref())?);

    let has_badges = r.read_bool()?;
    fields.insert("hasBadges", has_badges);
    if has_badges {
        r.advance(4)?;
        r.read_vec3()?;
        r.read_list(|r| {
            r.read_string()?;
            r.read_string()
        })?;
        r.read_list(|r| r.read_string())?;
    }

    fields.insert("ghostNickname", r.read_string()?);
    fields.insert("ghostAvatarName", r.read_string()?);

    if version >= 2 {
        fields.insert("recordingContext", r.read_string()?);
    }
    if version >= 4 {
        r.advance(4)?;
    }
    if version >= 5 {
        fields.insert("recordData", r.read_node_ref()?);
        r.read_list(|r| r.read_i32())?;
    }
    if version >= 6 {
        fields.insert("ghostTrigram", r.read_string()?);
    }
    if version >= 7 {
        fields.insert("ghostZone", r.read_string()?);
    }
    if version >= 8 {
        fields.insert("ghostClubTag", r.read_string()?);
    }
    Ok(fields)
}

fn read_race_time(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("raceTime", r.read_u32()?))
}

fn read_respawns(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("numRespawns", r.read_i32()?))
}

fn read_trail_color(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("lightTrailColor", r.read_color()?))
}

fn read_stunts_score(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("stuntsScore", r.read_u32()?))
}

fn read_checkpoints(r: &mut Reader<'_>) -> Result<Fields> {
    let checkpoints = r.read_list(|r| {
        Ok(Fields::new()
            .with("time", r.read_u32()?)
            .with("stuntsScore", r.read_u32()?))
    })?;
    Ok(Fields::new().with("checkpoints", checkpoints))
}

fn read_uid(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("uid", r.read_lookback_raw()?))
}

fn read_login(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("ghostLogin", r.read_string()?))
}

fn read_unused_lookback(r: &mut Reader<'_>) -> Result<Fields> {
    r.read_lookback()?;
    Ok(Fields::new())
}

fn read_player_mobil(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("playerMobilId", r.read_lookback()?))
}

fn read_skins(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("skinPackDescs", r.read_list(|r| r.read_file_ref())?)
        .with("ghostNickname", r.read_string()?)
        .with("ghostAvatarName", r.read_string()?))
}

fn read_unused_meta(r: &mut Reader<'_>) -> Result<Fields> {
    r.read_meta()?;
    Ok(Fields::new())
}

fn is_025_ver1(node: &Node) -> bool {
    node.get(IS_025_VER1)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Validation data: input events and the game build that recorded them.
///
/// Returns the fields and whether the event block was present.
fn read_events(r: &mut Reader<'_>, is_025_ver1: bool) -> Result<(Fields, bool)> {
    let events_duration = r.read_i32()?;
    let mut fields = Fields::new().with("eventsDuration", events_duration);
    if events_duration == 0 && !is_025_ver1 {
        return Ok((fields, false));
    }

    r.advance(4)?;
    fields.insert("controlNames", r.read_list(|r| r.read_lookback())?);

    let num_entries = r.read_i32()?;
    r.advance(4)?;
    let entries = r.read_list_n(usize::try_from(num_entries).unwrap_or(0), |r| {
        Ok(Fields::new()
            .with("time", i64::from(r.read_i32()?) - 100_000)
            .with("controlNameIndex", r.read_u8()?)
            .with("onoff", r.read_u32()?))
    })?;
    fields.insert("controlEntries", entries);

    fields.insert("gameVersion", r.read_string()?);
    fields.insert("exeChecksum", r.read_u32()?);
    fields.insert("osKind", r.read_i32()?);
    fields.insert("cpuKind", r.read_i32()?);
    fields.insert("raceSettingsXML", r.read_string()?);
    Ok((fields, true))
}

fn read_validation(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    let (fields, _) = read_events(r, is_025_ver1(node))?;
    Ok(fields)
}

fn read_events_with_tail(r: &mut Reader<'_>, is_025_ver1: bool) -> Result<(Fields, bool)> {
    let (fields, present) = read_events(r, is_025_ver1)?;
    if present {
        r.advance(4)?;
    }
    Ok((fields, present))
}

fn read_validation_tail(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    let (fields, _) = read_events_with_tail(r, is_025_ver1(node))?;
    Ok(fields)
}

fn read_validation_versioned(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    let version = r.read_i32()?;
    let flag = version >= 1;
    node.fields.insert(IS_025_VER1, flag);

    let (fields, present) = read_events_with_tail(r, flag)?;
    if present {
        r.advance(4)?;
    }
    Ok(fields)
}

fn read_player_inputs(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0309_201D;
    let version = r.read_u32()?;
    if version < 2 {
        return Err(r.bad_version(ID, version));
    }

    let inputs = r.read_list(|r| {
        r.advance(8)?;
        if version >= 4 {
            r.advance(4)?;
        }
        r.advance(4)?;
        r.read_prefixed_bytes()?;
        Ok(())
    })?;

    Ok(Fields::new()
        .with("version", version)
        .with("numPlayerInputs", inputs.len() as u32))
}

// =============================================================================
// CGameGhost
// =============================================================================

fn read_sample_data(r: &mut Reader<'_>) -> Result<Fields> {
    let data = read_compressed_block(r, Codec::Zlib)?;
    let mut c = Cursor::new(&data);

    let class_id = c.read_u32()?;
    if class_id == NULL_CLASS_ID {
        return Ok(Fields::new());
    }

    let skip_sample_times = c.read_bool()?;
    c.advance(4)?;
    let sample_period = c.read_u32()?;
    c.advance(4)?;
    let size = c.read_u32()? as usize;
    let sample_data = c.read_bytes(size)?.to_vec();

    let mut fields = Fields::new()
        .with("samplePeriod", sample_period)
        .with("sampleData", Value::Bytes(sample_data));

    let num_samples = c.read_u32()?;
    if num_samples > 0 {
        fields.insert("firstSampleOffset", c.read_u32()?);
    }
    if num_samples > 1 {
        let size_per_sample = c.read_i32()?;
        fields.insert("sizePerSample", size_per_sample);
        if size_per_sample == -1 {
            let mut sizes = Vec::with_capacity((num_samples as usize - 1).min(c.remaining()));
            for _ in 1..num_samples {
                sizes.push(c.read_u32()?);
            }
            fields.insert("sampleSizes", sizes);
        }
    }

    if !skip_sample_times {
        let count = usize::try_from(c.read_i32()?).unwrap_or(0);
        let mut times = Vec::with_capacity(count.min(c.remaining()));
        for _ in 0..count {
            times.push(c.read_i32()?);
        }
        fields.insert("sampleTimes", times);
    }

    Ok(fields)
}

fn read_replaying_sample_data(r: &mut Reader<'_>) -> Result<Fields> {
    let is_replaying = r.read_bool()?;
    let mut fields = Fields::new().with("isReplaying", is_replaying);
    fields.merge(read_sample_data(r)?);
    Ok(fields)
}
