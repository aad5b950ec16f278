//! Media tracker: clips, tracks and the blocks placed on them

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::Fields;
use crate::reader::Reader;

pub const CLIP_CLASS_ID: u32 = 0x0307_9000;
pub const TRACK_CLASS_ID: u32 = 0x0307_8000;

pub const CHUNKS: &[ChunkEntry] = &[
    // CGameCtnMediaClip
    ChunkEntry::read(0x0307_9002, read_clip_with_tail),
    ChunkEntry::read(0x0307_9003, read_clip),
    ChunkEntry::read(0x0307_9004, skip_u32),
    ChunkEntry::read(0x0307_9005, read_clip),
    ChunkEntry::read(0x0307_9007, read_clip_local_player),
    ChunkEntry::read(0x0307_900A, read_clip_stop_when_leave),
    ChunkEntry::read(0x0307_900D, read_clip_versioned),
    // CGameCtnMediaTrack
    ChunkEntry::read(0x0307_8001, read_track),
    ChunkEntry::read(0x0307_8002, read_track_keep_playing),
    ChunkEntry::read(0x0307_8003, read_track_read_only),
    ChunkEntry::read(0x0307_8004, read_track_flags),
    ChunkEntry::read(0x0307_8005, read_track_versioned),
    // CGameCtnMediaClipGroup
    ChunkEntry::read(0x0307_A003, read_clip_group),
    // CGameCtnMediaBlockCameraGame
    ChunkEntry::read(0x0308_4007, read_camera_game),
    // CGameCtnMediaBlockCameraCustom
    ChunkEntry::read(0x030A_2006, read_camera_custom),
    // CGameCtnMediaBlockCameraPath
    ChunkEntry::read(0x030A_1003, read_camera_path),
    // CGameCtnMediaBlockCameraOrbital
    ChunkEntry::read(0x030A_0001, skip_to_end),
    // CGameCtnMediaBlockTriangles (2D and 3D)
    ChunkEntry::read(0x0302_9001, read_triangles),
    // CGameCtnMediaBlockFog
    ChunkEntry::read(0x0319_9000, read_fog),
    // CGameCtnMediaBlockFxColors
    ChunkEntry::read(0x0308_0000, read_fx_colors),
    ChunkEntry::read(0x0308_0001, read_fx_colors),
    ChunkEntry::read(0x0308_0002, read_fx_colors),
    ChunkEntry::read(0x0308_0003, read_fx_colors),
    // CGameCtnMediaBlockDOF
    ChunkEntry::read(0x0312_6000, read_dof_v0),
    ChunkEntry::read(0x0312_6001, read_dof_v1),
    ChunkEntry::read(0x0312_6002, read_dof_v2),
    // CGameCtnMediaBlockSound
    ChunkEntry::read(0x030A_7001, read_sound),
    ChunkEntry::read(0x030A_7002, read_sound_playback),
    ChunkEntry::read(0x030A_7003, read_sound_playback_versioned),
    ChunkEntry::read(0x030A_7004, read_sound_versioned),
    // CGameCtnMediaBlockText
    ChunkEntry::read(0x030A_8001, read_text),
    ChunkEntry::read(0x030A_8002, read_text_color),
    // CGameCtnMediaBlockImage
    ChunkEntry::read(0x030A_5000, read_image),
    // CGameCtnMediaBlockTransitionFade
    ChunkEntry::read(0x030A_B000, read_transition_fade),
    // CGameCtnMediaBlockDirtyLens
    ChunkEntry::read(0x0316_5000, read_dirty_lens),
    // CGameCtnMediaBlockTrails
    ChunkEntry::read(0x030A_9000, read_trails),
    // CGameCtnMediaBlockCamFxShake
    ChunkEntry::read(0x030A_4000, read_camera_shake),
    // CGameCtnMediaBlockInterface
    ChunkEntry::read(0x0319_5000, read_interface),
    // CGameCtnMediaBlockEntity
    ChunkEntry::read(0x0329_F000, read_entity),
    // CControlEffectSimi
    ChunkEntry::read(0x0701_0003, read_effect_simi),
    ChunkEntry::read(0x0701_0004, read_effect_simi_blend),
    ChunkEntry::read(0x0701_0005, read_effect_simi_interpolated),
];

fn skip_u32(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new())
}

fn skip_to_end(r: &mut Reader<'_>) -> Result<Fields> {
    r.skip_to_node_end()?;
    Ok(Fields::new())
}

// =============================================================================
// Clips and tracks
// =============================================================================

fn read_clip(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    Ok(Fields::new()
        .with("tracks", r.read_node_ref_list()?)
        .with("clipName", r.read_string()?))
}

fn read_clip_with_tail(r: &mut Reader<'_>) -> Result<Fields> {
    let fields = read_clip(r)?;
    r.advance(4)?;
    Ok(fields)
}

fn read_clip_local_player(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("localPlayerClipEntIndex", r.read_u32()?))
}

fn read_clip_stop_when_leave(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("stopWhenLeave", r.read_bool()?))
}

fn read_clip_versioned(r: &mut Reader<'_>) -> Result<Fields> {
    let mut fields = Fields::new()
        .with("version", r.read_i32()?)
        .with("listVersion", r.read_i32()?)
        .with("tracks", r.read_node_ref_list()?)
        .with("clipName", r.read_string()?)
        .with("stopWhenLeave", r.read_bool()?);
    r.advance(4)?;
    fields.insert("stopWhenRespawn", r.read_bool()?);
    r.read_string()?;
    r.advance(4)?;
    fields.insert("localPlayerClipEntIndex", r.read_u32()?);
    Ok(fields)
}

fn read_track(r: &mut Reader<'_>) -> Result<Fields> {
    let fields = Fields::new()
        .with("trackName", r.read_string()?)
        .with("version", r.read_i32()?)
        .with("blocks", r.read_node_ref_list()?);
    r.advance(4)?;
    Ok(fields)
}

fn read_track_keep_playing(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("keepPlaying", r.read_bool()?))
}

fn read_track_read_only(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("isReadOnly", r.read_bool()?))
}

fn read_track_flags(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("keepPlaying", r.read_bool()?)
        .with("isReadOnly", r.read_bool()?))
}

fn read_track_versioned(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    let fields = Fields::new()
        .with("version", version)
        .with("isKeepPlaying", r.read_bool()?)
        .with("isReadOnly", r.read_bool()?)
        .with("isCycling", r.read_bool()?);
    if version >= 1 {
        r.advance(8)?;
    }
    Ok(fields)
}

fn read_clip_group(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?;
    let clips = r.read_node_ref_list()?;
    let references = r.read_list(|r| {
        let mut fields = Fields::new()
            .with("referenceFramePosition", r.read_vec3()?)
            .with("referenceFrameRotation", r.read_u32()?)
            .with("triggerCondition", r.read_u32()?)
            .with("triggerArgument", r.read_f32()?);
        let count = r.read_u32()? as usize;
        fields.insert("triggers", r.read_list_n(count, |r| r.read_vec3())?);
        Ok(fields)
    })?;
    Ok(Fields::new()
        .with("clips", clips)
        .with("referenceClips", references))
}

// =============================================================================
// Cameras
// =============================================================================

fn read_camera_game(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    let mut fields = Fields::new()
        .with("version", version)
        .with("start", r.read_f32()?)
        .with("end", r.read_f32()?);

    if version < 2 {
        fields.insert("gameCam", r.read_lookback()?);
    } else {
        fields.insert("gameCam", r.read_u32()?);
    }

    fields.insert("clipEntId", r.read_u32()?);
    fields.insert("camPosition", r.read_vec3()?);
    fields.insert("camPitchYawRoll", r.read_vec3()?);

    let fov = r.read_f32()?;
    fields.insert("camFov", if fov == 0.0 { 90.0 } else { fov });
    r.advance(8)?;

    fields.insert("camNearClipPlane", r.read_f32()?);
    fields.insert("camFarClipPlane", r.read_f32()?);
    r.advance(12)?;

    if version >= 1 {
        r.advance(4)?;
    }
    if version >= 3 {
        r.advance(4)?;
    }
    Ok(fields)
}

/// Tangent of a custom camera key
fn read_interp_val(r: &mut Reader<'_>, version: u32) -> Result<Fields> {
    let mut fields = Fields::new()
        .with("position", r.read_vec3()?)
        .with("pitchYawRoll", r.read_vec3()?)
        .with("fov", r.read_f32()?)
        .with("targetPosition", r.read_vec3()?);
    if version >= 7 {
        fields.insert("nearZ", r.read_f32()?);
    }
    Ok(fields)
}

fn read_camera_custom(r: &mut Reader<'_>) -> Result<Fields> {
    // Stored as an offset from 6
    let version = 6 + r.read_version(0x030A_2006, 3)?;

    let keys = r.read_list(|r| {
        let mut key = Fields::new()
            .with("time", r.read_f32()?)
            .with("interpolation", r.read_u32()?)
            .with("anchorRot", r.read_bool()?)
            .with("anchor", r.read_u32()?)
            .with("anchorVis", r.read_bool()?)
            .with("target", r.read_u32()?)
            .with("position", r.read_vec3()?)
            .with("pitchYawRoll", r.read_vec3()?)
            .with("fov", r.read_f32()?)
            .with("targetPosition", r.read_vec3()?);
        if version >= 7 {
            key.insert("nearZ", r.read_f32()?);
        }
        key.insert("leftTangent", read_interp_val(r, version)?);
        key.insert("rightTangent", read_interp_val(r, version)?);
        if version == 8 {
            r.advance(8)?;
        }
        Ok(key)
    })?;

    Ok(Fields::new().with("version", version).with("keys", keys))
}

fn read_camera_path(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let positions = r.read_list(|r| {
        let mut key = Fields::new()
            .with("time", r.read_f32()?)
            .with("position", r.read_vec3()?)
            .with("pitchYawRoll", r.read_vec3()?)
            .with("fov", r.read_f32()?);
        let near_z = if version >= 3 { r.read_f32()? } else { 0.0 };
        key.insert("nearZ", near_z);
        key.insert("anchorRot", r.read_bool()?);
        key.insert("anchor", r.read_i32()?);
        key.insert("anchorVis", r.read_bool()?);
        key.insert("target", r.read_i32()?);
        key.insert("targetPosition", r.read_vec3()?);
        key.insert("weight", r.read_f32()?);
        r.read_quat()?;
        if version >= 4 {
            r.advance(8)?;
        }
        Ok(key)
    })?;
    Ok(Fields::new().with("positions", positions))
}

fn read_camera_shake(r: &mut Reader<'_>) -> Result<Fields> {
    let keys = r.read_list(|r| {
        Ok(Fields::new()
            .with("time", r.read_f32()?)
            .with("intensity", r.read_f32()?)
            .with("speed", r.read_f32()?))
    })?;
    Ok(Fields::new().with("keys", keys))
}

// =============================================================================
// Effects
// =============================================================================

fn read_triangles(r: &mut Reader<'_>) -> Result<Fields> {
    let times = r.read_list(|r| r.read_f32())?;

    let num_triangles = r.read_u32()? as usize;
    let num_points = r.read_u32()? as usize;
    let groups = r.read_list_n(num_triangles, |r| r.read_list_n(num_points, |r| r.read_vec3()))?;

    let colors = r.read_list(|r| {
        Ok(Fields::new()
            .with("color", r.read_color()?)
            .with("opacity", r.read_f32()?))
    })?;

    let triangles = r.read_list(|r| {
        Ok(Fields::new()
            .with("vertex1", r.read_u32()?)
            .with("vertex2", r.read_u32()?)
            .with("vertex3", r.read_u32()?))
    })?;

    r.advance(28)?;

    Ok(Fields::new()
        .with("times", times)
        .with("groups", groups)
        .with("colors", colors)
        .with("triangles", triangles))
}

fn read_fog(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let keys = r.read_list(|r| {
        let mut key = Fields::new()
            .with("time", r.read_f32()?)
            .with("intensity", r.read_f32()?)
            .with("skyIntensity", r.read_f32()?)
            .with("distance", r.read_f32()?);
        if version >= 1 {
            key.insert("coefficient", r.read_f32()?);
            key.insert("color", r.read_color()?);
        }
        if version >= 2 {
            key.insert("cloudsOpacity", r.read_f32()?);
            key.insert("cloudsSpeed", r.read_f32()?);
        }
        Ok(key)
    })?;
    Ok(Fields::new().with("keys", keys))
}

fn read_fx_colors(r: &mut Reader<'_>) -> Result<Fields> {
    let keys = r.read_list(|r| {
        let mut key = Fields::new();
        for name in [
            "time",
            "intensity",
            "blendZ",
            "distance",
            "farDistance",
            "inverse",
            "hue",
            "saturation",
            "brightness",
            "contrast",
        ] {
            key.insert(name, r.read_f32()?);
        }
        key.insert("rgb", r.read_color()?);
        r.advance(16)?;

        for name in [
            "farInverse",
            "farHue",
            "farSaturation",
            "farBrightness",
            "farContrast",
        ] {
            key.insert(name, r.read_f32()?);
        }
        key.insert("farRgb", r.read_color()?);
        r.advance(16)?;
        Ok(key)
    })?;
    Ok(Fields::new().with("keys", keys))
}

fn read_dof(r: &mut Reader<'_>, version: u32) -> Result<Fields> {
    let keys = r.read_list(|r| {
        let mut key = Fields::new()
            .with("time", r.read_f32()?)
            .with("zFocus", r.read_f32()?)
            .with("lensSize", r.read_f32()?);
        if version >= 1 {
            key.insert("target", r.read_i32()?);
        }
        if version >= 2 {
            key.insert("targetPosition", r.read_vec3()?);
        }
        Ok(key)
    })?;
    Ok(Fields::new().with("keys", keys))
}

fn read_dof_v0(r: &mut Reader<'_>) -> Result<Fields> {
    read_dof(r, 0)
}

fn read_dof_v1(r: &mut Reader<'_>) -> Result<Fields> {
    read_dof(r, 1)
}

fn read_dof_v2(r: &mut Reader<'_>) -> Result<Fields> {
    read_dof(r, 2)
}

fn read_sound_keys(r: &mut Reader<'_>, version: i32) -> Result<Fields> {
    let keys = r.read_list(|r| {
        let mut key = Fields::new()
            .with("time", r.read_f32()?)
            .with("volume", r.read_f32()?)
            .with("pan", r.read_f32()?);
        if version >= 1 {
            key.insert("position", r.read_vec3()?);
        }
        Ok(key)
    })?;
    Ok(Fields::new().with("keys", keys))
}

fn read_sound(r: &mut Reader<'_>) -> Result<Fields> {
    let sound = r.read_file_ref()?;
    let mut fields = Fields::new().with("sound", sound);
    fields.merge(read_sound_keys(r, 0)?);
    Ok(fields)
}

fn read_sound_versioned(r: &mut Reader<'_>) -> Result<Fields> {
    let sound = r.read_file_ref()?;
    let version = r.read_i32()?;
    let mut fields = Fields::new().with("sound", sound);
    fields.merge(read_sound_keys(r, version)?);
    Ok(fields)
}

fn read_sound_playback(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("playCount", r.read_i32()?)
        .with("isLooping", r.read_bool()?))
}

fn read_sound_playback_versioned(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let mut fields = Fields::new()
        .with("playCount", r.read_i32()?)
        .with("isLooping", r.read_bool()?)
        .with("isMusic", r.read_bool()?);
    if version >= 1 {
        fields.insert("stopWithClip", r.read_bool()?);
    }
    if version >= 2 {
        fields.insert("audioToSpeech", r.read_bool()?);
        fields.insert("audioToSpeechTarget", r.read_i32()?);
    }
    Ok(fields)
}

fn read_text(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("text", r.read_string()?)
        .with("effect", r.read_node_ref()?))
}

fn read_text_color(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("textColor", r.read_color()?))
}

fn read_image(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("effect", r.read_node_ref()?)
        .with("image", r.read_file_ref()?))
}

fn read_transition_fade(r: &mut Reader<'_>) -> Result<Fields> {
    let keys = r.read_list(|r| {
        Ok(Fields::new()
            .with("time", r.read_f32()?)
            .with("opacity", r.read_f32()?))
    })?;
    let color = r.read_color()?;
    r.advance(4)?;
    Ok(Fields::new().with("keys", keys).with("color", color))
}

fn read_dirty_lens(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    let keys = r.read_list(|r| {
        Ok(Fields::new()
            .with("time", r.read_f32()?)
            .with("intensity", r.read_f32()?))
    })?;
    Ok(Fields::new().with("keys", keys))
}

fn read_trails(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("start", r.read_f32()?)
        .with("end", r.read_f32()?))
}

fn read_interface(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    Ok(Fields::new()
        .with("start", r.read_f32()?)
        .with("end", r.read_f32()?)
        .with("showInterface", r.read_bool()?)
        .with("maniaLink", r.read_string()?))
}

fn read_entity(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    let fields = Fields::new()
        .with("version", version)
        .with("recordData", r.read_node_ref()?);

    // Later layouts are not decoded; the rest of the node is passed over
    if version > 3 {
        r.skip_to_node_end()?;
        return Ok(fields);
    }

    r.advance(12)?;
    r.read_list(|r| r.read_u32())?;

    if version >= 2 {
        r.advance(28)?;
    }
    if version >= 3 {
        r.read_meta()?;
        r.advance(16)?;
        if r.read_bool()? {
            let kind = r.read_u32()?;
            r.advance(12)?;
            if kind == 0 {
                r.advance(4)?;
                r.read_string()?;
            }
            r.read_list(|r| {
                r.read_string()?;
                r.read_string()
            })?;
            r.read_list(|r| r.read_string())?;
        }
    }
    Ok(fields)
}

// =============================================================================
// CControlEffectSimi
// =============================================================================

fn read_simi_frame(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("timestamp", r.read_f32()?)
        .with("position", r.read_vec2()?)
        .with("rotation", r.read_f32()?)
        .with("scaleX", r.read_f32()?)
        .with("scaleY", r.read_f32()?)
        .with("opacity", r.read_f32()?)
        .with("depth", r.read_f32()?))
}

fn read_effect_simi(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("frames", r.read_list(read_simi_frame)?)
        .with("centered", r.read_bool()?))
}

fn read_effect_simi_blend(r: &mut Reader<'_>) -> Result<Fields> {
    let frames = r.read_list(|r| {
        let mut frame = read_simi_frame(r)?;
        r.advance(4)?;
        frame.insert("isContinuousEffect", r.read_f32()?);
        r.advance(8)?;
        Ok(frame)
    })?;
    Ok(Fields::new()
        .with("frames", frames)
        .with("centered", r.read_bool()?)
        .with("colorBlendMode", r.read_u32()?)
        .with("isContinuousEffect", r.read_bool()?))
}

fn read_effect_simi_interpolated(r: &mut Reader<'_>) -> Result<Fields> {
    let mut fields = read_effect_simi_blend(r)?;
    fields.insert("isInterpolated", r.read_bool()?);
    Ok(fields)
}
