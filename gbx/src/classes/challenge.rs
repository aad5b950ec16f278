//! CGameCtnChallenge (maps)

use hashbrown::HashMap;

use crate::chunk::ChunkEntry;
use crate::embedded;
use crate::error::{Error, Result};
use crate::node::{Block, DifficultyColor, Fields, MacroBlockInstance, Node, NodeId, Value};
use crate::reader::Reader;
use crate::types::Int3;

pub const CLASS_ID: u32 = 0x0304_3000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::read(0x0304_300D, read_vehicle),
    ChunkEntry::read(0x0304_3011, read_parameters),
    ChunkEntry::read(0x0304_3013, read_blocks_unversioned),
    ChunkEntry::skip(0x0304_3017),
    ChunkEntry::skippable(0x0304_3018, read_laps),
    ChunkEntry::skippable(0x0304_3019, read_mod_pack),
    ChunkEntry::skip(0x0304_301C),
    ChunkEntry::read(0x0304_301F, read_blocks_versioned),
    ChunkEntry::read(0x0304_3022, skip_u32),
    ChunkEntry::read(0x0304_3024, read_music),
    ChunkEntry::read(0x0304_3025, read_map_coords),
    ChunkEntry::read(0x0304_3026, read_clip_global),
    ChunkEntry::read(0x0304_3027, read_archived_camera),
    ChunkEntry::read(0x0304_3028, read_comments),
    ChunkEntry::skippable(0x0304_3029, read_password),
    ChunkEntry::read(0x0304_302A, skip_u32),
    ChunkEntry::skip(0x0304_3034),
    ChunkEntry::skip(0x0304_303D),
    ChunkEntry::skippable(0x0304_3040, read_anchored_objects),
    ChunkEntry::skippable(0x0304_3042, read_author),
    ChunkEntry::skippable(0x0304_3043, read_genealogies),
    ChunkEntry::skip(0x0304_3044),
    ChunkEntry::skippable(0x0304_3048, read_baked_blocks),
    ChunkEntry::skippable(0x0304_3049, read_media_clips),
    ChunkEntry::skippable(0x0304_304B, read_objectives),
    ChunkEntry::skippable(0x0304_3050, read_offzones),
    ChunkEntry::skippable(0x0304_3051, read_title),
    ChunkEntry::skippable(0x0304_3052, read_deco_height),
    ChunkEntry::skippable(0x0304_3053, read_bot_paths),
    ChunkEntry::skippable(0x0304_3054, read_embedded_items),
    ChunkEntry::skip(0x0304_3055),
    ChunkEntry::skippable(0x0304_3056, read_light_settings),
    ChunkEntry::skip(0x0304_3057),
    ChunkEntry::skip(0x0304_3058),
    ChunkEntry::skip(0x0304_3059),
    ChunkEntry::skip(0x0304_305A),
    ChunkEntry::skip(0x0304_305B),
    ChunkEntry::skip(0x0304_305C),
    ChunkEntry::skip(0x0304_305D),
    ChunkEntry::skip(0x0304_305E),
    ChunkEntry::skip(0x0304_305F),
    ChunkEntry::skip(0x0304_3060),
    ChunkEntry::skip(0x0304_3061),
    ChunkEntry::skippable_mutate(0x0304_3062, read_colors),
    ChunkEntry::skippable_mutate(0x0304_3063, read_animation_offsets),
    ChunkEntry::skip(0x0304_3064),
    ChunkEntry::skippable_mutate(0x0304_3065, read_foreground_packs),
    ChunkEntry::skip(0x0304_3067),
    ChunkEntry::skippable_mutate(0x0304_3068, read_lightmap_quality),
    ChunkEntry::skippable_mutate(0x0304_3069, read_macroblock_instances),
    ChunkEntry::skip(0x0304_306B),
];

/// Block flag: custom block carrying an author and a skin
const BLOCK_FLAG_CUSTOM: u32 = 0x8000;
/// Block flag: block parameters node follows
const BLOCK_FLAG_PARAMETERS: u32 = 0x10_0000;
/// Block entry that occupies a slot in the stream but is not a block
const BLOCK_FLAGS_NONE: u32 = 0xFFFF_FFFF;

fn skip_u32(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new())
}

fn read_vehicle(r: &mut Reader<'_>) -> Result<Fields> {
    let meta = r.read_meta()?;
    Ok(Fields::new()
        .with("vehicle", meta.id)
        .with("vehicleCollection", meta.collection)
        .with("vehicleAuthor", meta.author))
}

fn read_parameters(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("collectorList", r.read_node_ref()?)
        .with("challengeParameters", r.read_node_ref()?)
        .with("kind", r.read_u32()?))
}

fn read_laps(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("isLapRace", r.read_bool()?)
        .with("lapCount", r.read_i32()?))
}

fn read_mod_pack(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("modPackDesc", r.read_file_ref()?))
}

fn read_blocks_unversioned(r: &mut Reader<'_>) -> Result<Fields> {
    read_blocks(r, false)
}

fn read_blocks_versioned(r: &mut Reader<'_>) -> Result<Fields> {
    read_blocks(r, true)
}

fn read_blocks(r: &mut Reader<'_>, versioned: bool) -> Result<Fields> {
    let map_info = r.read_meta()?;
    let map_name = r.read_string()?;
    let decoration = r.read_meta()?;
    let size = r.read_int3()?;
    let need_unlock = r.read_bool()?;
    let version = if versioned { r.read_u32()? } else { 0 };

    let mut remaining = r.read_u32()?;
    let mut blocks = Vec::with_capacity((remaining as usize).min(r.remaining()));
    while remaining > 0 {
        let name = r.read_lookback()?;
        let rotation = r.read_u8()?;
        let coord = r.read_byte3()?;
        let flags = if version == 0 {
            r.read_u16()? as u32
        } else {
            r.read_u32()?
        };

        // Placeholder entries do not count towards the block total
        if flags == BLOCK_FLAGS_NONE {
            continue;
        }
        remaining -= 1;

        let mut block = Block {
            name,
            rotation,
            coord,
            flags,
            ..Default::default()
        };
        if flags & BLOCK_FLAG_CUSTOM != 0 {
            block.author = Some(r.read_lookback()?);
            block.skin = r.read_node_ref()?;
        }
        if flags & BLOCK_FLAG_PARAMETERS != 0 {
            block.block_parameters = r.read_node_ref()?;
        }
        blocks.push(block);
    }

    tracing::debug!(count = blocks.len(), version, "read blocks");

    Ok(Fields::new()
        .with("mapUid", map_info.id)
        .with("environment", map_info.collection)
        .with("mapAuthor", map_info.author)
        .with("mapName", map_name)
        .with("timeOfDay", decoration.id)
        .with("decorationEnvironment", decoration.collection)
        .with("decorationAuthor", decoration.author)
        .with("size", size)
        .with("needUnlock", need_unlock)
        .with("blocks", blocks))
}

fn read_music(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("customMusicPackDesc", r.read_file_ref()?))
}

fn read_map_coords(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("mapCoordOrigin", r.read_vec2()?)
        .with("mapCoordTarget", r.read_vec2()?))
}

fn read_clip_global(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("clipGlobal", r.read_node_ref()?))
}

fn read_archived_camera(r: &mut Reader<'_>) -> Result<Fields> {
    let has_camera = r.read_u32()?;
    if has_camera != 0 {
        r.advance(1 + 9 + 3 + 4 * 3)?;
    }
    Ok(Fields::new())
}

fn read_comments(r: &mut Reader<'_>) -> Result<Fields> {
    let mut fields = read_archived_camera(r)?;
    fields.insert("comments", r.read_string()?);
    Ok(fields)
}

fn read_password(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("hashedPassword", Value::Bytes(r.read_bytes(16)?.to_vec()))
        .with("crc32", r.read_u32()?))
}

fn read_anchored_objects(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x0304_3040;
    let version = r.read_version(ID, 7)?;
    r.advance(4)?;
    let size = r.read_u32()?;

    r.encapsulated(|r| {
        r.advance(4)?;
        let objects = r.read_list(|r| r.decode_node(None))?;

        if version >= 1 && version != 5 {
            let pairs = r.read_list(|r| r.read_int2())?;
            for pair in pairs {
                let (Some(parent), Some(child)) = (slot(&objects, pair.x), slot(&objects, pair.y))
                else {
                    return Err(r.unsupported(
                        ID,
                        format!("item placed on item {} outside the item list", pair.x),
                    ));
                };
                if let (Some(parent), Some(child)) = (parent, child) {
                    if let Some(node) = r.node_mut(child) {
                        node.fields.insert("placedOnItem", parent);
                    }
                }
            }
        }

        let mut fields = Fields::new().with("size", size);
        if version >= 5 {
            fields.insert("blockIndexes", r.read_list(|r| r.read_i32())?);
            if version < 7 {
                fields.insert("snapItemGroups", r.read_list(|r| r.read_i32())?);
            }
            if version >= 6 {
                fields.insert("itemIndexes", r.read_list(|r| r.read_i32())?);
            }
            if version >= 7 {
                fields.insert("snapItemGroups", r.read_list(|r| r.read_i32())?);
            }
            if version != 6 {
                r.read_list(|r| r.read_i32())?;
            }
            fields.insert("snappedIndexes", r.read_list(|r| r.read_i32())?);
        }

        tracing::debug!(count = objects.len(), version, "read anchored objects");
        fields.insert("anchoredObjects", objects);
        Ok(fields)
    })
}

fn slot(objects: &[Option<NodeId>], index: i32) -> Option<Option<NodeId>> {
    usize::try_from(index)
        .ok()
        .and_then(|i| objects.get(i))
        .copied()
}

fn read_author(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    Ok(Fields::new()
        .with("authorVersion", r.read_i32()?)
        .with("authorLogin", r.read_string()?)
        .with("authorNickname", r.read_string()?)
        .with("authorZone", r.read_string()?)
        .with("authorExtraInfo", r.read_string()?))
}

fn read_genealogies(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    let size = r.read_i32()?;
    let genealogies = r.encapsulated(|r| r.read_list(|r| r.decode_node(None)))?;
    Ok(Fields::new()
        .with("sizeOfNodeWithClassId", size)
        .with("genealogies", genealogies))
}

fn read_baked_block(r: &mut Reader<'_>) -> Result<Block> {
    let name = r.read_lookback()?;
    let rotation = r.read_u8()?;
    let mut coord = r.read_byte3()?;
    let flags = r.read_i32()?;
    if flags != -1 {
        coord = Int3::new(coord.x - 1, coord.y, coord.z - 1);
    }
    Ok(Block {
        name,
        rotation,
        coord,
        flags: flags as u32,
        ..Default::default()
    })
}

fn read_baked_blocks(r: &mut Reader<'_>) -> Result<Fields> {
    r.read_version(0x0304_3048, 0)?;
    r.advance(4)?;

    let mut remaining = r.read_i32()?;
    let mut blocks = Vec::new();
    while remaining > 0 {
        let block = read_baked_block(r)?;
        // Placeholder entries are kept but do not count towards the total
        if block.flags != u32::MAX {
            remaining -= 1;
        }
        blocks.push(block);
    }

    // Further blocks follow for as long as the next value is a fresh lookback string
    while r.peek_u32()? & 0xC000_0000 != 0 {
        blocks.push(read_baked_block(r)?);
    }

    r.advance(4)?;
    let clips = r.read_list(|r| {
        Ok(Fields::new()
            .with("clip1", r.read_meta()?)
            .with("clip2", r.read_meta()?)
            .with("clip3", r.read_meta()?)
            .with("clip4", r.read_meta()?)
            .with("coord", r.read_int3()?))
    })?;

    Ok(Fields::new()
        .with("bakedBlocks", blocks)
        .with("bakedClipsAdditionalData", clips))
}

fn read_media_clips(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    let mut fields = Fields::new()
        .with("version", version)
        .with("clipIntro", r.read_node_ref()?)
        .with("clipPodium", r.read_node_ref()?)
        .with("clipGroupInGame", r.read_node_ref()?)
        .with("clipGroupEndRace", r.read_node_ref()?);
    if version >= 2 {
        fields.insert("clipAmbiance", r.read_node_ref()?);
    }
    if version >= 1 {
        fields.insert("triggerSize", r.read_int3()?);
    }
    Ok(fields)
}

fn read_objectives(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("objectiveTextAuthor", r.read_string()?)
        .with("objectiveTextGold", r.read_string()?)
        .with("objectiveTextSilver", r.read_string()?)
        .with("objectiveTextBronze", r.read_string()?))
}

fn read_offzones(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    let trigger_size = r.read_vec3()?;
    let offzones = r.read_list(|r| Ok(vec![r.read_int3()?, r.read_int3()?]))?;
    Ok(Fields::new()
        .with("triggerSize", trigger_size)
        .with("offzones", offzones))
}

fn read_title(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new()
        .with("titleId", r.read_lookback()?)
        .with("buildVersion", r.read_string()?))
}

fn read_deco_height(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new().with("decoBaseHeightOffset", r.read_i32()?))
}

fn read_bot_paths(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    let paths = r.read_list(|r| {
        Ok(Fields::new()
            .with("clan", r.read_i32()?)
            .with("path", r.read_list(|r| r.read_vec3())?)
            .with("isFlying", r.read_bool()?)
            .with("waypointSpecialProperty", r.read_node_ref()?)
            .with("isAutonomous", r.read_bool()?))
    })?;
    Ok(Fields::new().with("botPaths", paths))
}

fn read_embedded_items(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    r.advance(4)?;
    let size = r.read_u32()?;

    r.encapsulated(|r| {
        let items = r.read_list(|r| r.read_meta())?;
        let offset = r.position();
        let archive = r.read_prefixed_bytes()?;

        let mut fields = Fields::new()
            .with("version", version)
            .with("size", size)
            .with("embedded", items);

        if !archive.is_empty() {
            if r.options().decode_embedded {
                let (entries, failures) =
                    embedded::decode_archive(archive, offset, r.options(), r.embedded_depth())?;
                fields.insert("embeddedData", entries);
                fields.insert("embeddedFailures", failures);
            } else {
                fields.insert("embeddedArchive", Value::Bytes(archive.to_vec()));
            }
        }

        fields.insert("textures", r.read_list(|r| r.read_string())?);
        Ok(fields)
    })
}

fn read_light_settings(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    r.advance(4)?;
    let day_time = r.read_u32()?;
    r.advance(4)?;
    Ok(Fields::new()
        .with("dayTime", day_time)
        .with("dynamicDayLight", r.read_bool()?)
        .with("dayDuration", r.read_i32()?))
}

// =============================================================================
// Per-element annotations of blocks and items decoded by earlier chunks
// =============================================================================

fn require<'n>(node: &'n Node, chunk_id: u32, field: &'static str) -> Result<&'n Value> {
    node.get(field).ok_or(Error::MissingField { chunk_id, field })
}

fn blocks_mut<'n>(
    node: &'n mut Node,
    chunk_id: u32,
    field: &'static str,
) -> Result<&'n mut Vec<Block>> {
    match node.fields.get_mut(field) {
        Some(Value::Blocks(blocks)) => Ok(blocks),
        _ => Err(Error::MissingField { chunk_id, field }),
    }
}

/// Anchored object slots; null entries are kept so positions line up with the stream
fn items(node: &Node, chunk_id: u32) -> Result<Vec<Option<NodeId>>> {
    match require(node, chunk_id, "anchoredObjects")? {
        Value::List(items) => Ok(items
            .iter()
            .map(|v| match v {
                Value::Node(id) => *id,
                _ => None,
            })
            .collect()),
        _ => Err(Error::MissingField {
            chunk_id,
            field: "anchoredObjects",
        }),
    }
}

fn set_item_field(r: &mut Reader<'_>, item: Option<NodeId>, name: &'static str, value: Value) {
    if let Some(node) = item.and_then(|id| r.node_mut(id)) {
        node.fields.insert(name, value);
    }
}

fn read_colors(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0304_3062;
    r.read_version(ID, 0)?;
    let items = items(node, ID)?;
    require(node, ID, "blocks")?;
    require(node, ID, "bakedBlocks")?;

    for block in blocks_mut(node, ID, "blocks")? {
        block.color = Some(DifficultyColor::from(r.read_u8()?));
    }
    for block in blocks_mut(node, ID, "bakedBlocks")? {
        block.color = Some(DifficultyColor::from(r.read_u8()?));
    }
    for item in items {
        let color = r.read_u8()?;
        set_item_field(r, item, "color", Value::U8(color));
    }
    Ok(Fields::new())
}

fn read_animation_offsets(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0304_3063;
    r.read_version(ID, 0)?;
    for item in items(node, ID)? {
        let offset = r.read_u8()?;
        set_item_field(r, item, "animationPhaseOffset", Value::U8(offset));
    }
    Ok(Fields::new())
}

fn read_foreground_packs(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0304_3065;
    r.read_version(ID, 0)?;
    for item in items(node, ID)? {
        if r.read_bool_u8()? {
            let pack = r.read_file_ref()?;
            set_item_field(r, item, "foregroundPackDesc", Value::FileRef(pack));
        }
    }
    Ok(Fields::new())
}

fn read_lightmap_quality(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0304_3068;
    r.read_version(ID, 1)?;
    let items = items(node, ID)?;
    require(node, ID, "blocks")?;
    require(node, ID, "bakedBlocks")?;

    for block in blocks_mut(node, ID, "blocks")? {
        block.lightmap_quality = Some(r.read_u8()?);
    }
    for block in blocks_mut(node, ID, "bakedBlocks")? {
        block.lightmap_quality = Some(r.read_u8()?);
    }
    for item in items {
        let quality = r.read_u8()?;
        set_item_field(r, item, "lightMapQuality", Value::U8(quality));
    }
    Ok(Fields::new())
}

/// Instances are numbered in order of first appearance
#[derive(Default)]
struct Instances {
    list: Vec<MacroBlockInstance>,
    by_id: HashMap<i32, usize>,
}

impl Instances {
    fn index_of(&mut self, id: i32) -> usize {
        *self.by_id.entry(id).or_insert_with(|| {
            self.list.push(MacroBlockInstance { id, flags: None });
            self.list.len() - 1
        })
    }
}

fn read_macroblock_instances(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0304_3069;
    r.read_version(ID, 0)?;
    let items = items(node, ID)?;
    require(node, ID, "blocks")?;

    let mut instances = Instances::default();
    for block in blocks_mut(node, ID, "blocks")? {
        let id = r.read_i32()?;
        if id != -1 {
            block.macro_block_instance = Some(instances.index_of(id));
        }
    }
    for item in items {
        let id = r.read_i32()?;
        if id != -1 {
            let index = instances.index_of(id) as u32;
            set_item_field(r, item, "macroBlockInstance", Value::U32(index));
        }
    }

    for pair in r.read_list(|r| r.read_int2())? {
        match instances.by_id.get(&pair.x) {
            Some(&index) => instances.list[index].flags = Some(pair.y),
            None => {
                return Err(r.unsupported(
                    ID,
                    format!("flags for unused macroblock instance {}", pair.x),
                ));
            }
        }
    }

    Ok(Fields::new().with("macroBlockInstances", instances.list))
}
