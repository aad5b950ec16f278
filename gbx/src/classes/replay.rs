//! CGameCtnReplayRecord

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::{Fields, Value};
use crate::reader::Reader;

pub const CLASS_ID: u32 = 0x0309_3000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::read(0x0309_3002, read_map_data),
    ChunkEntry::read(0x0309_3014, read_ghosts),
    ChunkEntry::read(0x0309_3015, read_clip),
    ChunkEntry::skippable(0x0309_3018, read_author),
    ChunkEntry::skip(0x0309_301C),
    ChunkEntry::read(0x0309_3024, read_record_data),
];

fn read_map_data(r: &mut Reader<'_>) -> Result<Fields> {
    let data = r.read_prefixed_bytes()?;
    Ok(Fields::new().with("challengeData", Value::Bytes(data.to_vec())))
}

fn read_ghosts(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let ghosts = r.read_node_ref_list()?;
    r.advance(4)?;
    r.read_list(|r| r.advance(8))?;
    Ok(Fields::new().with("version", version).with("ghosts", ghosts))
}

fn read_clip(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("clip", r.read_node_ref()?))
}

fn read_author(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("titleId", r.read_lookback()?)
        .with("authorVersion", r.read_i32()?)
        .with("authorLogin", r.read_string()?)
        .with("authorNickname", r.read_string()?)
        .with("authorZone", r.read_string()?)
        .with("authorExtraInfo", r.read_string()?))
}

fn read_record_data(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    r.advance(4)?;
    Ok(Fields::new().with("recordData", r.read_node_ref()?))
}
