//! Chunk layouts of the individual class families.
//!
//! Each test decodes a small body through the public entry points. Layered chunks
//! are checked by running the newer and the older chunk over the same prefix.

mod gbx_builder;

use gbx::{Error, Gbx, Node, Value, parse_gbx};
use gbx_builder::*;
use serde_json::json;

const GHOST: u32 = 0x0309_2000;
const GAME_GHOST: u32 = 0x0303_F000;
const REPLAY: u32 = 0x0309_3000;
const CHALLENGE: u32 = 0x0304_3000;
const CLIP: u32 = 0x0307_9000;
const TRACK: u32 = 0x0307_8000;
const FX_COLORS: u32 = 0x0308_0000;
const EFFECT_SIMI: u32 = 0x0701_0000;
const MACROBLOCK: u32 = 0x0310_D000;
const ITEM_MODEL: u32 = 0x2E00_2000;
const ENTITY_MODEL: u32 = 0x2E02_7000;
const TREE_GENERATOR: u32 = 0x0905_1000;
const CRYSTAL: u32 = 0x0900_3000;
const MATERIAL: u32 = 0x090F_D000;

fn decode(class_id: u32, body: &Bytes) -> Gbx {
    parse_gbx(&file(class_id, body)).unwrap()
}

fn fields_json(node: &Node) -> serde_json::Value {
    serde_json::to_value(&node.fields).unwrap()
}

// =============================================================================
// Ghosts
// =============================================================================

/// Validation block after `eventsDuration`: one control name, two entries
fn validation_events(body: Bytes) -> Bytes {
    body.u32(0)
        .i32(1)
        .u32(LOOKBACK_VERSION)
        .lookback("Accelerate")
        .i32(2)
        .u32(0)
        .i32(100_050)
        .u8(0)
        .u32(1)
        .i32(i32::MIN)
        .u8(0)
        .u32(0)
        .string("3.3.0")
        .u32(0xABCD)
        .i32(1)
        .i32(2)
        .string("<settings/>")
}

#[test]
fn test_versioned_validation_wraps_older_chunks() {
    // Version 1 forces the event block even with a zero duration, then both
    // wrapping layers add a four-byte tail
    let body = validation_events(Bytes::new().chunk(0x0309_2025).i32(1).i32(0))
        .u32(0)
        .u32(0)
        .end();

    let gbx = decode(GHOST, &body);
    let ghost = gbx.body();
    assert_eq!(ghost.get("is025Ver1").and_then(Value::as_bool), Some(true));
    assert_eq!(ghost.get("eventsDuration").and_then(Value::as_i32), Some(0));
    assert_eq!(ghost.get("gameVersion").and_then(Value::as_str), Some("3.3.0"));
    assert_eq!(
        ghost.get("raceSettingsXML").and_then(Value::as_str),
        Some("<settings/>")
    );

    let json = fields_json(ghost);
    assert_eq!(json["controlNames"], json!(["Accelerate"]));
    assert_eq!(json["controlEntries"][0]["time"], json!(50));
    assert_eq!(json["controlEntries"][0]["onoff"], json!(1));
    assert_eq!(
        json["controlEntries"][1]["time"],
        json!(i64::from(i32::MIN) - 100_000)
    );
}

#[test]
fn test_versioned_validation_without_events() {
    let body = Bytes::new()
        .chunk(0x0309_2025)
        .i32(0)
        .i32(0)
        .chunk(0x0309_200F)
        .string("player")
        .end();

    let gbx = decode(GHOST, &body);
    let ghost = gbx.body();
    assert_eq!(ghost.get("is025Ver1").and_then(Value::as_bool), Some(false));
    assert!(!ghost.fields.contains("controlNames"));
    assert_eq!(ghost.get("ghostLogin").and_then(Value::as_str), Some("player"));
}

#[test]
fn test_validation_tail_only_follows_events() {
    let with_events = validation_events(Bytes::new().chunk(0x0309_2019).i32(1000))
        .u32(0)
        .end();
    let gbx = decode(GHOST, &with_events);
    assert_eq!(gbx.body().get("eventsDuration").and_then(Value::as_i32), Some(1000));
    assert_eq!(gbx.body().get("exeChecksum").and_then(Value::as_u32), Some(0xABCD));

    let empty = Bytes::new()
        .chunk(0x0309_2019)
        .i32(0)
        .chunk(0x0309_200F)
        .string("player")
        .end();
    let gbx = decode(GHOST, &empty);
    assert_eq!(gbx.body().get("ghostLogin").and_then(Value::as_str), Some("player"));
}

#[test]
fn test_event_time_below_offset_does_not_overflow() {
    let body = Bytes::new()
        .chunk(0x0309_2011)
        .i32(1)
        .u32(0)
        .i32(0) // control names
        .i32(1)
        .u32(0)
        .i32(i32::MIN)
        .u8(0)
        .u32(1)
        .string("")
        .u32(0)
        .i32(0)
        .i32(0)
        .string("")
        .end();

    let gbx = decode(GHOST, &body);
    let entries = gbx.body().get("controlEntries").and_then(Value::as_list).unwrap();
    let time = entries[0].as_record().and_then(|e| e.get("time")).and_then(Value::as_i64);
    assert_eq!(time, Some(i64::from(i32::MIN) - 100_000));
}

#[test]
fn test_ghost_race_results() {
    let checkpoints = Bytes::new().i32(2).u32(10_000).u32(0).u32(21_500).u32(0);
    let body = Bytes::new()
        .skippable(0x0309_2005, &Bytes::new().u32(21_500))
        .skippable(0x0309_2008, &Bytes::new().i32(3))
        .skippable(0x0309_200B, &checkpoints)
        .end();

    let gbx = decode(GHOST, &body);
    let ghost = gbx.body();
    assert_eq!(ghost.get("raceTime").and_then(Value::as_u32), Some(21_500));
    assert_eq!(ghost.get("numRespawns").and_then(Value::as_i32), Some(3));
    assert_eq!(
        fields_json(ghost)["checkpoints"],
        json!([
            { "time": 10_000, "stuntsScore": 0 },
            { "time": 21_500, "stuntsScore": 0 },
        ])
    );
}

/// zlib sample block with two samples of explicit sizes and times
fn sample_block() -> Bytes {
    let data = Bytes::new()
        .u32(0x0A01_8000)
        .u32(0) // sample times follow
        .u32(0)
        .u32(50)
        .u32(0)
        .bytes(&[1, 2, 3])
        .u32(2)
        .u32(0)
        .i32(-1)
        .u32(3)
        .i32(2)
        .i32(0)
        .i32(50);
    zlib_block(&data.0)
}

#[test]
fn test_replaying_sample_data_wraps_sample_data() {
    let plain = decode(
        GAME_GHOST,
        &Bytes::new().chunk(0x0303_F005).raw(&sample_block().0).end(),
    );
    let replaying = decode(
        GAME_GHOST,
        &Bytes::new()
            .chunk(0x0303_F006)
            .u32(1)
            .raw(&sample_block().0)
            .end(),
    );

    let ghost = replaying.body();
    assert_eq!(ghost.get("isReplaying").and_then(Value::as_bool), Some(true));
    assert_eq!(ghost.get("samplePeriod").and_then(Value::as_u32), Some(50));
    assert_eq!(
        ghost.get("sampleData").and_then(Value::as_bytes),
        Some(&[1u8, 2, 3][..])
    );

    let mut json = fields_json(ghost);
    assert_eq!(json["sampleSizes"], json!([3]));
    assert_eq!(json["sampleTimes"], json!([0, 50]));
    json.as_object_mut().unwrap().remove("isReplaying");
    assert_eq!(json, fields_json(plain.body()));
}

// =============================================================================
// Replays
// =============================================================================

#[test]
fn test_replay_ghosts_and_author() {
    let author = Bytes::new()
        .u32(LOOKBACK_VERSION)
        .lookback("TMStadium")
        .i32(1)
        .string("login")
        .string("Nick")
        .string("World|Europe")
        .string("");
    let body = Bytes::new()
        .chunk(0x0309_3014)
        .i32(8)
        .i32(1)
        .node_ref(1, GHOST)
        .skippable(0x0309_2005, &Bytes::new().u32(45_000))
        .end()
        .u32(0)
        .i32(0)
        .skippable(0x0309_3018, &author)
        .end();

    let gbx = decode(REPLAY, &body);
    let replay = gbx.body();
    assert_eq!(replay.get("titleId").and_then(Value::as_str), Some("TMStadium"));
    assert_eq!(replay.get("authorLogin").and_then(Value::as_str), Some("login"));

    let ghosts = replay.node_list("ghosts");
    assert_eq!(ghosts.len(), 1);
    let ghost = gbx.node(ghosts[0]).unwrap();
    assert_eq!(ghost.class_id, GHOST);
    assert_eq!(ghost.get("raceTime").and_then(Value::as_u32), Some(45_000));
    // The ghost carries no record data
    assert!(gbx.ghost_samples().is_empty());
}

// =============================================================================
// Maps
// =============================================================================

#[test]
fn test_comments_wrap_archived_camera() {
    let body = Bytes::new()
        .chunk(0x0304_3028)
        .u32(1)
        .raw(&[0; 25])
        .string("Hello")
        .chunk(0x0304_3027)
        .u32(0)
        .end();
    let gbx = decode(CHALLENGE, &body);
    assert_eq!(gbx.body().get("comments").and_then(Value::as_str), Some("Hello"));

    let body = Bytes::new().chunk(0x0304_3028).u32(0).string("").end();
    let gbx = decode(CHALLENGE, &body);
    assert_eq!(gbx.body().get("comments").and_then(Value::as_str), Some(""));
}

#[test]
fn test_collector_list_entries() {
    let body = Bytes::new()
        .chunk(0x0301_B000)
        .i32(1)
        .u32(LOOKBACK_VERSION)
        .lookback("StadiumRoadMain")
        .u32(6)
        .lookback("Nadeo")
        .u32(3)
        .end();
    let gbx = decode(0x0301_B000, &body);
    assert_eq!(
        fields_json(gbx.body())["collectorList"],
        json!([{
            "blockName": "StadiumRoadMain",
            "collection": "Stadium",
            "author": "Nadeo",
            "numPieces": 3,
        }])
    );
}

#[test]
fn test_waypoint_versions() {
    let body = Bytes::new()
        .chunk(0x2E00_9000)
        .u32(2)
        .string("Checkpoint")
        .u32(1)
        .end();
    let gbx = decode(0x2E00_9000, &body);
    assert_eq!(gbx.body().get("tag").and_then(Value::as_str), Some("Checkpoint"));
    assert_eq!(gbx.body().get("order").and_then(Value::as_u32), Some(1));

    let body = Bytes::new().chunk(0x0313_B000).u32(3).end();
    let err = parse_gbx(&file(0x0313_B000, &body)).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedVersion {
            chunk_id: 0x0313_B000,
            version: 3,
            ..
        }
    ));
}

// =============================================================================
// Macroblocks
// =============================================================================

fn object_spawns(trailer: i32) -> Bytes {
    Bytes::new()
        .chunk(0x0310_D00E)
        .u32(3)
        .i32(1)
        .u32(14)
        .lookback("Flag")
        .u32(6)
        .lookback_ref(2)
        .f32(0.0)
        .f32(0.5)
        .f32(0.0)
        .i32(2)
        .i32(1)
        .i32(2)
        .u32(0) // anchor tree id
        .f32(64.0)
        .f32(8.0)
        .f32(64.0)
        .u16(0)
        .f32(0.0)
        .f32(0.0)
        .f32(0.0)
        .i32(0) // waypoint
        .f32(1.5)
        .i32(0)
        .i32(0)
        .i32(0)
        .u32(0)
        .u8(0) // no pack descriptors
        .i32(trailer)
        .i32(0)
}

fn macroblock(trailer: i32) -> Bytes {
    let spawns = Bytes::new()
        .chunk(0x0310_D000)
        .i32(1)
        .u32(5)
        .u32(LOOKBACK_VERSION)
        .lookback("RoadStraight")
        .u32(6)
        .lookback("Nadeo")
        .u32(0) // flags
        .raw(&[1, 2, 3])
        .u8(1)
        .i32(0)
        .i32(0);
    spawns.raw(&object_spawns(trailer).0).end()
}

#[test]
fn test_macroblock_spawns() {
    let gbx = decode(MACROBLOCK, &macroblock(-1));
    let json = fields_json(gbx.body());

    let block = &json["blockSpawns"][0];
    assert_eq!(block["blockModel"]["id"], json!("RoadStraight"));
    assert_eq!(block["coord"], json!({ "x": 1, "y": 2, "z": 3 }));
    assert_eq!(block["direction"], json!(1));
    assert_eq!(block["waypoint"], json!(null));

    let object = &json["objectSpawns"][0];
    assert_eq!(object["itemModel"]["id"], json!("Flag"));
    assert_eq!(object["itemModel"]["author"], json!("Nadeo"));
    assert_eq!(object["scale"], json!(1.5));
    assert_eq!(object["absolutePositionInMap"], json!({ "x": 64.0, "y": 8.0, "z": 64.0 }));
}

#[test]
fn test_macroblock_object_trailer() {
    let err = parse_gbx(&file(MACROBLOCK, &macroblock(5))).unwrap_err();
    assert!(matches!(
        err,
        Error::Unsupported {
            chunk_id: 0x0310_D00E,
            ..
        }
    ));
}

// =============================================================================
// Media tracker
// =============================================================================

fn fx_key(body: Bytes) -> Bytes {
    let mut body = body;
    for i in 0..10 {
        body = body.f32(i as f32);
    }
    body = body.f32(1.0).f32(0.5).f32(0.25).raw(&[0; 16]);
    for i in 0..5 {
        body = body.f32(i as f32 + 0.5);
    }
    body.f32(0.0).f32(0.0).f32(1.0).raw(&[0; 16])
}

#[test]
fn test_fx_colors_chunks_share_layout() {
    let decoded: Vec<_> = (0..4)
        .map(|i| {
            let body = fx_key(Bytes::new().chunk(0x0308_0000 + i).i32(1)).end();
            fields_json(decode(FX_COLORS, &body).body())
        })
        .collect();

    assert_eq!(decoded[0]["keys"][0]["hue"], json!(6.0));
    assert_eq!(decoded[0]["keys"][0]["rgb"], json!({ "r": 1.0, "g": 0.5, "b": 0.25 }));
    assert_eq!(decoded[0]["keys"][0]["farContrast"], json!(4.5));
    assert!(decoded.iter().all(|d| *d == decoded[0]));
}

#[test]
fn test_clip_track_and_block() {
    let body = Bytes::new()
        .chunk(0x0307_900D)
        .i32(1)
        .i32(10)
        .i32(1)
        .node_ref(1, TRACK)
        .chunk(0x0307_8001)
        .string("Cam")
        .i32(1)
        .i32(1)
        .node_ref(2, FX_COLORS)
        .chunk(0x0308_0003)
        .i32(0)
        .end()
        .u32(0)
        .end()
        .string("Intro")
        .u32(0)
        .u32(0)
        .u32(1)
        .string("")
        .u32(0)
        .u32(3)
        .end();

    let gbx = decode(CLIP, &body);
    let clip = gbx.body();
    assert_eq!(clip.get("clipName").and_then(Value::as_str), Some("Intro"));
    assert_eq!(clip.get("stopWhenRespawn").and_then(Value::as_bool), Some(true));
    assert_eq!(clip.get("localPlayerClipEntIndex").and_then(Value::as_u32), Some(3));

    let track = gbx.node(clip.node_list("tracks")[0]).unwrap();
    assert_eq!(track.get("trackName").and_then(Value::as_str), Some("Cam"));
    let block = gbx.node(track.node_list("blocks")[0]).unwrap();
    assert_eq!(block.class_id, FX_COLORS);
    assert_eq!(block.get("keys").and_then(Value::as_list).map(|keys| keys.len()), Some(0));
}

/// One frame of the 0x07010004 layout
fn simi_frames(body: Bytes) -> Bytes {
    body.i32(1)
        .f32(0.5)
        .f32(0.25)
        .f32(0.75)
        .f32(0.0)
        .f32(1.0)
        .f32(1.0)
        .f32(0.75)
        .f32(2.0)
        .u32(0)
        .f32(1.0)
        .raw(&[0; 8])
}

#[test]
fn test_interpolated_simi_wraps_blend() {
    let blend = simi_frames(Bytes::new().chunk(0x0701_0004))
        .u32(1)
        .u32(2)
        .u32(0)
        .end();
    let interpolated = simi_frames(Bytes::new().chunk(0x0701_0005))
        .u32(1)
        .u32(2)
        .u32(0)
        .u32(1)
        .end();

    let gbx = decode(EFFECT_SIMI, &interpolated);
    let effect = gbx.body();
    assert_eq!(effect.get("isInterpolated").and_then(Value::as_bool), Some(true));
    assert_eq!(effect.get("colorBlendMode").and_then(Value::as_u32), Some(2));

    let mut json = fields_json(effect);
    assert_eq!(json["frames"][0]["position"], json!({ "x": 0.25, "y": 0.75 }));
    assert_eq!(json["frames"][0]["opacity"], json!(0.75));
    assert_eq!(json["frames"][0]["isContinuousEffect"], json!(1.0));
    json.as_object_mut().unwrap().remove("isInterpolated");
    assert_eq!(json, fields_json(decode(EFFECT_SIMI, &blend).body()));
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn test_item_model_with_legacy_models() {
    let body = Bytes::new()
        .chunk(0x2E00_100D)
        .string("A tree")
        .chunk(0x2E00_1011)
        .u32(1)
        .u32(0)
        .u32(1)
        .u32(12)
        .u8(2)
        .chunk(0x2E00_2015)
        .i32(1) // ornament
        .chunk(0x2E00_2019)
        .i32(8)
        // Ornaments before version 9 store the models first
        .node_ref(1, TREE_GENERATOR)
        .chunk(0x0905_1000)
        .i32(3)
        .end()
        .i32(0)
        .u32(LOOKBACK_VERSION)
        .u32(0) // default weapon
        .i32(0)
        .i32(0)
        .u32(0)
        .i32(2)
        .i32(0)
        .node_ref(2, ENTITY_MODEL)
        .chunk(0x2E02_7000)
        .u32(0)
        .i32(0)
        .i32(0)
        .end()
        .end();

    let gbx = decode(ITEM_MODEL, &body);
    let item = gbx.body();
    assert_eq!(item.get("description").and_then(Value::as_str), Some("A tree"));
    assert_eq!(item.get("isAdvanced").and_then(Value::as_bool), Some(true));
    assert_eq!(item.get("prodState").and_then(Value::as_u32), Some(2));
    assert_eq!(item.get("defaultCam").and_then(Value::as_i32), Some(2));
    assert_eq!(item.get("defaultWeaponName").and_then(Value::as_str), Some(""));
    assert!(!item.fields.contains("visModelCustom"));

    let phy = gbx.node(item.node_ref("phyModelCustom").unwrap()).unwrap();
    assert_eq!(phy.class_id, TREE_GENERATOR);
    assert_eq!(phy.get("version").and_then(Value::as_i32), Some(3));

    let entity = gbx.node(item.node_ref("entityModel").unwrap()).unwrap();
    assert_eq!(entity.class_id, ENTITY_MODEL);
    assert!(matches!(entity.get("phyModel"), Some(Value::Node(None))));
}

#[test]
fn test_block_item_variants() {
    let body = Bytes::new()
        .chunk(0x2E02_5000)
        .u32(0)
        .u32(LOOKBACK_VERSION)
        .lookback("RoadTechCurve")
        .u32(6)
        .i32(1)
        .i32(0)
        .i32(0)
        .end();

    let gbx = decode(0x2E02_5000, &body);
    let json = fields_json(gbx.body());
    assert_eq!(json["archeTypeBlockInfoId"], json!("RoadTechCurve"));
    assert_eq!(json["archeTypeBlockInfoCollectionId"], json!("Stadium"));
    assert_eq!(json["customizedVariants"], json!([{ "key": 0, "value": null }]));
}

#[test]
fn test_placement_param_and_pivots() {
    let mut body = Bytes::new()
        .chunk(0x2E02_0000)
        .u32(0)
        .u16(1)
        .f32(0.0)
        .f32(4.0)
        .f32(0.0);
    for step in [32.0, 8.0, 8.0, 0.0, 0.0, 1.0, 0.0, 0.0] {
        body = body.f32(step);
    }
    let body = body
        .chunk(0x2E02_0001)
        .i32(1)
        .f32(0.0)
        .f32(1.0)
        .f32(0.0)
        .i32(1)
        .f32(0.0)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .end();

    let gbx = decode(0x2E02_0000, &body);
    let json = fields_json(gbx.body());
    assert_eq!(json["flags"], json!(1));
    assert_eq!(json["cubeCenter"], json!({ "x": 0.0, "y": 4.0, "z": 0.0 }));
    assert_eq!(json["gridSnapHStep"], json!(8.0));
    assert_eq!(json["flyVStep"], json!(1.0));
    assert_eq!(json["pivotPositions"], json!([{ "x": 0.0, "y": 1.0, "z": 0.0 }]));
    assert_eq!(
        json["pivotRotations"],
        json!([{ "x": 0.0, "y": 0.0, "z": 0.0, "w": 1.0 }])
    );
}

// =============================================================================
// Crystals and materials
// =============================================================================

/// Version 32 crystal: one group, a single triangle without material
fn triangle_crystal(body: Bytes) -> Bytes {
    body.i32(32)
        .raw(&[0; 36])
        .i32(1)
        .u32(0)
        .u32(0)
        .u32(0)
        .string("Part")
        .u32(0)
        .i32(0)
        .u32(1) // embedded geometry
        .i32(3)
        .f32(0.0)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .f32(0.0)
        .f32(0.0)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .i32(0) // edges
        .i32(1)
        .i32(3)
        .i32(0)
        .i32(1)
        .i32(2)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .f32(0.0)
        .f32(0.0)
        .f32(1.0)
        .i32(-1) // material
        .i32(0) // group
        .u32(0)
        .i32(0)
        .i32(0)
        .i32(0)
        .u32(0)
}

#[test]
fn test_single_layer_crystal() {
    let body = triangle_crystal(Bytes::new().chunk(0x0900_3000).u32(0)).end();
    let gbx = decode(CRYSTAL, &body);
    let json = fields_json(gbx.body());

    let layer = &json["layers"][0];
    assert_eq!(layer["layerId"], json!("Layer0"));
    assert_eq!(layer["type"], json!(0));
    assert_eq!(layer["version"], json!(32));
    assert_eq!(layer["groups"], json!(["Part"]));
    assert_eq!(layer["positions"].as_array().map(Vec::len), Some(3));

    let face = &layer["faces"][0];
    assert_eq!(face["group"], json!("Part"));
    assert!(face.get("material").is_none());
    assert_eq!(
        face["verts"][1],
        json!({ "position": { "x": 1.0, "y": 0.0, "z": 0.0 }, "uv": { "x": 1.0, "y": 0.0 } })
    );
}

fn modifier_layer(kind: i32) -> Bytes {
    Bytes::new()
        .chunk(0x0900_3005)
        .u32(0)
        .i32(1)
        .i32(kind)
        .i32(1)
        .u32(0)
        .u32(LOOKBACK_VERSION)
        .lookback("Move")
        .string("Move")
        .u32(1)
        .i32(0)
        .i32(1)
        .i32(0)
        .lookback_ref(1)
        .i32(0)
}

#[test]
fn test_translation_layer() {
    let body = modifier_layer(2).f32(0.0).f32(8.0).f32(0.0).end();
    let gbx = decode(CRYSTAL, &body);
    let json = fields_json(gbx.body());

    let layer = &json["layers"][0];
    assert_eq!(layer["layerName"], json!("Move"));
    assert_eq!(layer["isEnabled"], json!(true));
    assert_eq!(layer["mask"], json!([{ "groupIndex": 0, "layerId": "Move" }]));
    assert_eq!(layer["translation"], json!({ "x": 0.0, "y": 8.0, "z": 0.0 }));
}

#[test]
fn test_deformation_layer_is_unsupported() {
    let err = parse_gbx(&file(CRYSTAL, &modifier_layer(12).end())).unwrap_err();
    assert!(matches!(
        err,
        Error::Unsupported {
            chunk_id: 0x0900_3005,
            ..
        }
    ));
}

#[test]
fn test_material_user_inst() {
    let body = Bytes::new()
        .chunk(0x090F_D000)
        .i32(11)
        .u8(1)
        .u32(LOOKBACK_VERSION)
        .lookback("Asphalt")
        .string("")
        .u8(16)
        .u8(0)
        .string("Stadium\\Media\\Material\\RoadTech")
        .i32(0)
        .i32(0)
        .i32(0)
        .i32(0)
        .i32(1)
        .i32(0)
        .string("tex.dds")
        .u32(0) // hiding group
        .chunk(0x090F_D001)
        .i32(5)
        .i32(0)
        .i32(1)
        .i32(2)
        .f32(4.0)
        .u32(0)
        .u32(0)
        .end();

    let gbx = decode(MATERIAL, &body);
    let json = fields_json(gbx.body());
    assert_eq!(json["isUsingGameMaterial"], json!(true));
    assert_eq!(json["model"], json!("Asphalt"));
    assert_eq!(json["surfacePhysicId"], json!(16));
    assert_eq!(json["link"], json!("Stadium\\Media\\Material\\RoadTech"));
    assert_eq!(json["userTextures"], json!([{ "index": 0, "texture": "tex.dds" }]));
    assert_eq!(json["hidingGroup"], json!(""));
    assert_eq!(json["tilingV"], json!(2));
    assert_eq!(json["textureSizeInMeters"], json!(4.0));
    assert_eq!(json["isNatural"], json!(false));
}

#[test]
fn test_material_tiling_version_2() {
    let body = Bytes::new().chunk(0x090F_D001).i32(2).i32(0).end();
    let err = parse_gbx(&file(MATERIAL, &body)).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedVersion {
            chunk_id: 0x090F_D001,
            version: 2,
            ..
        }
    ));
}
