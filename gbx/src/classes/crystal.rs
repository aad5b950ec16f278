//! CPlugCrystal: editable item meshes made of layers

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::{Fields, Node, Value};
use crate::reader::Reader;
use crate::types::Vec2;

pub const CLASS_ID: u32 = 0x0900_3000;

pub const CHUNKS: &[ChunkEntry] = &[
    ChunkEntry::mutate(0x0900_3000, read_single_layer),
    ChunkEntry::read(0x0900_3003, read_materials),
    ChunkEntry::mutate(0x0900_3005, read_layers),
    ChunkEntry::read(0x0900_3006, read_uv_data),
    ChunkEntry::read(0x0900_3007, read_smoothing),
];

/// Layer kinds, as stored in the stream
pub mod layer_type {
    pub const GEOMETRY: i32 = 0;
    pub const SMOOTH: i32 = 1;
    pub const TRANSLATION: i32 = 2;
    pub const ROTATION: i32 = 3;
    pub const SCALE: i32 = 4;
    pub const MIRROR: i32 = 5;
    pub const SUBDIVIDE: i32 = 8;
    pub const CHAOS: i32 = 9;
    pub const DEFORMATION: i32 = 12;
    pub const CUBES: i32 = 13;
    pub const TRIGGER: i32 = 14;
    pub const SPAWN_POSITION: i32 = 15;
}

const MIN_CRYSTAL_VERSION: i32 = 21;

fn read_single_layer(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    r.advance(4)?; // version
    let materials = node.get("materials").and_then(Value::as_list);
    let crystal = read_crystal(r, 0x0900_3000, materials)?;

    let mut layer = Fields::new()
        .with("type", layer_type::GEOMETRY)
        .with("layerId", "Layer0")
        .with("layerName", "Geometry")
        .with("isEnabled", true);
    layer.merge(crystal);
    Ok(Fields::new().with("layers", vec![layer]))
}

fn read_materials(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    let materials = r.read_list(|r| {
        let name = r.read_string()?;
        if !name.is_empty() {
            return Ok(Value::String(name));
        }
        Ok(Value::Node(r.read_node_ref()?))
    })?;
    Ok(Fields::new().with("materials", Value::List(materials)))
}

fn read_layers(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    const ID: u32 = 0x0900_3005;
    r.advance(4)?; // version
    let materials = node.get("materials").and_then(Value::as_list);

    let layers = r.read_list(|r| {
        let kind = r.read_i32()?;
        let version = r.read_i32()?;
        r.advance(4)?;

        let mut layer = Fields::new()
            .with("type", kind)
            .with("layerId", r.read_lookback()?)
            .with("layerName", r.read_string()?);
        let enabled = if version >= 1 { r.read_bool()? } else { true };
        layer.insert("isEnabled", enabled);

        let type_version = r.read_i32()?;
        let body = match kind {
            layer_type::GEOMETRY => read_geometry_layer(r, type_version, materials)?,
            layer_type::TRIGGER => read_trigger_layer(r, type_version, materials)?,
            layer_type::CUBES => read_cubes_layer(r, type_version)?,
            _ => read_mask_layer(r, ID, type_version, kind)?,
        };
        layer.merge(body);
        Ok(layer)
    })?;

    Ok(Fields::new().with("layers", layers))
}

fn read_uv_data(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    if version == 0 {
        r.read_list(|r| r.read_vec2())?;
    }
    if version >= 1 {
        r.read_list(|r| r.read_u32())?;
        if version >= 2 {
            let len = usize::try_from(r.read_i32()?).unwrap_or(0);
            r.read_optimized_int_array(len, None)?;
        }
    }
    Ok(Fields::new())
}

fn read_smoothing(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    r.read_list(|r| r.read_f32())?;
    r.read_list(|r| r.read_i32())?;
    Ok(Fields::new())
}

// =============================================================================
// Layers
// =============================================================================

fn read_geometry_layer(
    r: &mut Reader<'_>,
    version: i32,
    materials: Option<&[Value]>,
) -> Result<Fields> {
    let mut fields = read_crystal(r, 0x0900_3005, materials)?;
    r.read_list(|r| r.read_i32())?;

    let (visible, collidable) = if version >= 1 {
        (r.read_bool()?, r.read_bool()?)
    } else {
        (true, true)
    };
    fields.insert("visible", visible);
    fields.insert("collidable", collidable);
    Ok(fields)
}

fn read_trigger_layer(
    r: &mut Reader<'_>,
    version: i32,
    materials: Option<&[Value]>,
) -> Result<Fields> {
    let fields = read_crystal(r, 0x0900_3005, materials)?;
    if version >= 1 {
        r.read_list(|r| r.read_i32())?;
    }
    Ok(fields)
}

fn read_cubes_layer(r: &mut Reader<'_>, version: i32) -> Result<Fields> {
    r.advance(1)?;
    let voxel_size = r.read_f32()?;
    if version >= 4 {
        r.read_vec3()?;
    }
    let fields = Fields::new()
        .with("voxelSize", voxel_size)
        .with("voxelModelArray", r.read_i32()?)
        .with("voxelModelArray2", r.read_i32()?);
    if version >= 2 {
        r.advance(8)?;
    }
    Ok(fields)
}

/// Modifier layers: a group mask followed by the modifier's own parameters.
fn read_mask_layer(r: &mut Reader<'_>, chunk_id: u32, _version: i32, kind: i32) -> Result<Fields> {
    let mask = r.read_list(|r| {
        Ok(Fields::new()
            .with("groupIndex", r.read_i32()?)
            .with("layerId", r.read_lookback()?))
    })?;
    let mask_version = r.read_i32()?;
    let fields = Fields::new()
        .with("mask", mask)
        .with("maskVersion", mask_version);

    let fields = match kind {
        layer_type::SCALE => fields
            .with("scale", r.read_vec3()?)
            .with("independent", r.read_bool()?),
        layer_type::SPAWN_POSITION => {
            let fields = fields
                .with("position", r.read_vec3()?)
                .with("horizontalAngle", r.read_f32()?)
                .with("verticalAngle", r.read_f32()?);
            let roll = if mask_version >= 1 { r.read_f32()? } else { 0.0 };
            fields.with("rollAngle", roll)
        }
        layer_type::TRANSLATION => fields.with("translation", r.read_vec3()?),
        layer_type::ROTATION => fields
            .with("rotation", r.read_f32()?)
            .with("axis", r.read_i32()?)
            .with("independent", r.read_bool()?),
        layer_type::MIRROR => fields
            .with("axis", r.read_i32()?)
            .with("distance", r.read_f32()?)
            .with("independent", r.read_bool()?),
        layer_type::CHAOS => {
            let min = r.read_f32()?;
            r.advance(4)?;
            fields
                .with("minDistance", min)
                .with("maxDistance", r.read_f32()?)
        }
        layer_type::SUBDIVIDE => fields.with("subdivisions", r.read_i32()?),
        layer_type::SMOOTH => fields.with("intensity", r.read_i32()?),
        layer_type::DEFORMATION => {
            return Err(r.unsupported(chunk_id, "deformation layer"));
        }
        other => return Err(r.unsupported(chunk_id, format!("layer type {other}"))),
    };
    Ok(fields)
}

// =============================================================================
// Crystal mesh
// =============================================================================

fn read_crystal(r: &mut Reader<'_>, chunk_id: u32, materials: Option<&[Value]>) -> Result<Fields> {
    let version = r.read_i32()?;
    r.advance(36)?;

    let groups = r.read_list(|r| {
        if version >= 31 {
            r.advance(4)?;
        }
        r.advance(if version >= 36 { 1 } else { 4 })?;
        r.advance(4)?;
        let name = r.read_string()?;
        r.advance(4)?;
        r.read_list(|r| r.read_i32())?;
        Ok(name)
    })?;

    if version < MIN_CRYSTAL_VERSION {
        return Err(r.bad_version(chunk_id, version));
    }

    let mut embedded = false;
    if version >= 25 {
        if version < 29 {
            r.read_bool()?;
            r.read_bool()?;
        }
        embedded = if version >= 34 {
            r.read_bool_u8()?
        } else {
            r.read_bool()?
        };
        if version >= 33 {
            r.advance(8)?;
        }
    }
    if !embedded {
        return Err(r.unsupported(chunk_id, "crystal without embedded geometry"));
    }

    let positions = r.read_list(|r| r.read_vec3())?;

    let edge_count = r.read_i32()?;
    if version >= 35 {
        let unfaced = usize::try_from(r.read_i32()?).unwrap_or(0);
        r.read_optimized_int_array(unfaced * 2, None)?;
    }
    let edge_count = if version >= 35 {
        0
    } else {
        usize::try_from(edge_count).unwrap_or(0)
    };
    r.read_list_n(edge_count, |r| r.read_int2())?;

    let face_count = usize::try_from(r.read_i32()?).unwrap_or(0);

    let mut shared_uvs: Option<(Vec<Vec2>, Vec<i32>)> = None;
    if version >= 37 {
        let uvs = r.read_list(|r| r.read_vec2())?;
        let len = usize::try_from(r.read_i32()?).unwrap_or(0);
        let indices = r.read_optimized_int_array(len, None)?;
        shared_uvs = Some((uvs, indices));
    }

    let mut uv_cursor = 0usize;
    let faces = r.read_list_n(face_count, |r| {
        let vert_count = if version >= 35 {
            r.read_u8()? as usize + 3
        } else {
            usize::try_from(r.read_i32()?).unwrap_or(0)
        };
        let indices = if version >= 34 {
            r.read_optimized_int_array(vert_count, Some(positions.len() as u32))?
        } else {
            r.read_list_n(vert_count, |r| r.read_i32())?
        };
        let position = |i: usize| {
            indices
                .get(i)
                .and_then(|&idx| usize::try_from(idx).ok())
                .and_then(|idx| positions.get(idx))
                .copied()
        };

        let mut verts = Vec::with_capacity(vert_count);
        if version < 27 {
            let uv_count = usize::try_from(r.read_i32()?).unwrap_or(0).min(vert_count);
            for i in 0..uv_count {
                let uv = r.read_vec2()?;
                verts.push(vertex(position(i), Some(uv)));
            }
            r.read_vec3()?;
        } else if version < 37 {
            for i in 0..vert_count {
                let uv = r.read_vec2()?;
                verts.push(vertex(position(i), Some(uv)));
            }
        } else if let Some((uvs, uv_indices)) = &shared_uvs {
            for i in 0..vert_count {
                let uv = uv_indices
                    .get(uv_cursor)
                    .and_then(|&idx| usize::try_from(idx).ok())
                    .and_then(|idx| uvs.get(idx))
                    .copied();
                uv_cursor += 1;
                verts.push(vertex(position(i), uv));
            }
        }

        let mut material_index = -1;
        if version >= 33 {
            material_index = match materials {
                Some(materials) => r.read_optimized_int(materials.len() as u32)?,
                None => r.read_i32()?,
            };
        } else if version >= 25 {
            material_index = r.read_i32()?;
        }

        let group_index = if version >= 33 {
            r.read_optimized_int(groups.len() as u32)?
        } else {
            r.read_i32()?
        };

        let group = usize::try_from(group_index)
            .ok()
            .and_then(|i| groups.get(i))
            .cloned();
        let material = usize::try_from(material_index)
            .ok()
            .and_then(|i| materials.and_then(|m| m.get(i)))
            .cloned();

        Ok(Fields::new()
            .with("verts", verts)
            .with_opt("group", group)
            .with_opt("material", material))
    })?;

    if version < 30 {
        r.advance(4 * faces.len())?;
    }
    if version < 29 {
        r.advance(4 * positions.len())?;
    }
    r.advance(4)?;

    if (7..32).contains(&version) {
        r.advance(4)?;
        if version >= 10 {
            r.advance(4)?;
            r.read_string()?;
            if version < 30 {
                r.read_list(|r| r.read_f32())?;
            }
        }
    }

    if version < 36 {
        let face_ints = usize::try_from(r.read_i32()?).unwrap_or(0);
        let edge_ints = usize::try_from(r.read_i32()?).unwrap_or(0);
        let vert_ints = usize::try_from(r.read_i32()?).unwrap_or(0);
        for n in [face_ints, edge_ints, vert_ints] {
            r.read_list_n(n, |r| r.read_i32())?;
        }
        r.advance(4)?;
    }

    Ok(Fields::new()
        .with("version", version)
        .with("positions", positions)
        .with("faces", faces)
        .with("groups", groups))
}

fn vertex(position: Option<crate::types::Vec3>, uv: Option<Vec2>) -> Fields {
    Fields::new()
        .with_opt("position", position)
        .with_opt("uv", uv)
}
