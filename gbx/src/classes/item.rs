//! Item models and their collector metadata

use crate::chunk::ChunkEntry;
use crate::error::Result;
use crate::node::{Fields, Node, Value};
use crate::reader::Reader;

pub const ITEM_MODEL_CLASS_ID: u32 = 0x2E00_2000;

pub const CHUNKS: &[ChunkEntry] = &[
    // CGameCtnCollector
    ChunkEntry::read(0x2E00_1009, read_page),
    ChunkEntry::read(0x2E00_100B, read_info),
    ChunkEntry::read(0x2E00_100C, read_collector_name),
    ChunkEntry::read(0x2E00_100D, read_description),
    ChunkEntry::read(0x2E00_100E, read_icon_settings),
    ChunkEntry::read(0x2E00_1010, read_skin_directory),
    ChunkEntry::read(0x2E00_1011, read_catalog),
    ChunkEntry::read(0x2E00_1012, skip_16),
    // CGameItemModel
    ChunkEntry::read(0x2E00_2000, read_item_type),
    ChunkEntry::read(0x2E00_2008, read_skin_fids),
    ChunkEntry::read(0x2E00_2009, read_cameras),
    ChunkEntry::read(0x2E00_200C, read_race_interface),
    ChunkEntry::read(0x2E00_2012, read_ground_point),
    ChunkEntry::read(0x2E00_2015, read_item_type_e),
    ChunkEntry::mutate(0x2E00_2019, read_models),
    ChunkEntry::read(0x2E00_201C, read_default_placement),
    ChunkEntry::read(0x2E00_201E, read_archetype),
    ChunkEntry::read(0x2E00_201F, read_waypoint_type),
    ChunkEntry::read(0x2E00_2020, read_icon),
    // CGameCommonItemEntityModelEdition
    ChunkEntry::read(0x2E02_6000, read_entity_model_edition),
    // CGameCommonItemEntityModel
    ChunkEntry::read(0x2E02_7000, read_entity_model),
    // CGameItemPlacementParam
    ChunkEntry::read(0x2E02_0000, read_placement_param),
    ChunkEntry::read(0x2E02_0001, read_pivots),
    // CGameBlockItem
    ChunkEntry::read(0x2E02_5000, read_block_item),
    // CPlugTreeGenerator
    ChunkEntry::read(0x0905_1000, read_tree_generator),
];

/// Item model categories
pub mod item_type {
    pub const ORNAMENT: i32 = 1;
    pub const PICK_UP: i32 = 2;
    pub const VEHICLE: i32 = 4;
}

fn skip_16(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(16)?;
    Ok(Fields::new())
}

// =============================================================================
// CGameCtnCollector
// =============================================================================

fn read_page(r: &mut Reader<'_>) -> Result<Fields> {
    let mut fields = Fields::new().with("pageName", r.read_string()?);
    if r.read_bool()? {
        fields.insert("iconFid", r.read_node_ref()?);
    }
    r.read_lookback()?;
    Ok(fields)
}

fn read_info(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("info", r.read_meta()?))
}

fn read_collector_name(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("collectorName", r.read_string()?))
}

fn read_description(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("description", r.read_string()?))
}

fn read_icon_settings(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("iconUseAutoRender", r.read_bool()?)
        .with("iconQuarterRotationY", r.read_u32()?))
}

fn read_skin_directory(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    r.read_node_ref()?;
    let skin_directory = r.read_string()?;
    if version >= 2 && skin_directory.is_empty() {
        r.advance(4)?;
    }
    Ok(Fields::new()
        .with("version", version)
        .with("skinDirectory", skin_directory))
}

fn read_catalog(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_u32()?;
    let mut fields = Fields::new()
        .with("version", version)
        .with("isInternal", r.read_bool()?)
        .with("isAdvanced", r.read_bool()?)
        .with("catalogPosition", r.read_u32()?);
    if version >= 1 {
        fields.insert("prodState", r.read_u8()?);
    }
    Ok(fields)
}

// =============================================================================
// CGameItemModel
// =============================================================================

fn read_item_type(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("itemType", r.read_i32()?))
}

fn read_skin_fids(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("nadeoSkinFids", r.read_node_ref_list()?))
}

fn read_cameras(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    Ok(Fields::new().with("cameras", r.read_node_ref_list()?))
}

fn read_race_interface(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("raceInterfaceFid", r.read_node_ref()?))
}

fn read_ground_point(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("groundPoint", r.read_vec3()?)
        .with("painterGroundMargin", r.read_f32()?)
        .with("orbitalCenterHeightFromGround", r.read_f32()?)
        .with("orbitalRadiusBase", r.read_f32()?)
        .with("orbitalPreviewAngle", r.read_f32()?))
}

fn read_item_type_e(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("itemTypeE", r.read_i32()?))
}

/// Physics and visual models; older versions store them ahead of the version-gated fields
fn read_models(r: &mut Reader<'_>, node: &mut Node) -> Result<Fields> {
    let version = r.read_i32()?;
    let item_type = node.get("itemTypeE").and_then(Value::as_i32);

    let legacy = match item_type {
        Some(item_type::ORNAMENT) => version < 9,
        Some(item_type::VEHICLE) => version < 10,
        _ => false,
    };

    let (mut phy_model, mut vis_model) = (None, None);
    if legacy {
        phy_model = r.read_node_ref()?;
        vis_model = r.read_node_ref()?;
    }

    let mut fields = Fields::new();
    if version >= 3 {
        fields.insert("defaultWeaponName", r.read_lookback()?);
    }
    if version >= 4 {
        let model = r.read_node_ref()?;
        phy_model = phy_model.or(model);
    }
    if version >= 5 {
        let model = r.read_node_ref()?;
        vis_model = vis_model.or(model);
    }
    if version >= 6 {
        r.advance(4)?;
    }
    if version >= 7 {
        fields.insert("defaultCam", r.read_i32()?);
    }
    if version >= 8 {
        fields.insert("entityModelEdition", r.read_node_ref()?);
        fields.insert("entityModel", r.read_node_ref()?);
    }
    if version >= 13 {
        r.read_node_ref()?;
    }
    if version >= 15 {
        r.read_node_ref()?;
    }

    Ok(fields
        .with_opt("phyModelCustom", phy_model)
        .with_opt("visModelCustom", vis_model))
}

fn read_default_placement(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    if version >= 5 {
        return Ok(Fields::new().with("defaultPlacement", r.read_node_ref()?));
    }

    let length = usize::try_from(r.read_i32()?).unwrap_or(0);
    if version >= 1 {
        r.advance(24)?;
    }
    if version >= 2 {
        r.advance(20)?;
    }
    if version >= 3 {
        r.advance(8)?;
        r.read_list_n(length, |r| r.read_vec3())?;
    }
    if version >= 4 {
        r.advance(4)?;
    }
    Ok(Fields::new())
}

fn read_archetype(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    let archetype = r.read_string()?;
    if archetype.is_empty() {
        r.advance(4)?;
    }
    if version >= 6 {
        r.advance(4)?;
    }
    if version >= 7 {
        r.advance(4)?;
    }
    Ok(Fields::new().with("archeTypeRef", archetype))
}

fn read_waypoint_type(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    if version < 7 {
        if version >= 5 {
            r.read_string()?;
            r.read_string()?;
            r.advance(4)?;
        }
        if version >= 4 {
            r.advance(4)?;
        }
        if version < 3 {
            r.advance(2)?;
        }
    }

    let mut fields = Fields::new().with("waypointType", r.read_i32()?);

    if version < 8 {
        r.read_iso4()?;
    }
    if version >= 6 {
        fields.insert("disableLightmap", r.read_bool()?);
    }
    if version >= 10 {
        r.advance(4)?;
    }
    if version >= 11 {
        r.advance(1)?;
    }
    if version >= 12 {
        r.advance(8)?;
    }
    Ok(fields)
}

fn read_icon(r: &mut Reader<'_>) -> Result<Fields> {
    let version = r.read_i32()?;
    if version < 2 {
        r.read_string()?;
        r.read_node_ref()?;
        return Ok(Fields::new());
    }

    let icon = r.read_string()?;
    if version >= 3 {
        r.advance(1)?;
    }
    Ok(Fields::new().with("iconFid", icon))
}

// =============================================================================
// Entity models and placement
// =============================================================================

fn read_entity_model_edition(r: &mut Reader<'_>) -> Result<Fields> {
    const ID: u32 = 0x2E02_6000;
    let version = r.read_i32()?;
    let item_type = r.read_i32()?;

    let mut fields = Fields::new()
        .with("itemType", item_type)
        .with("meshCrystal", r.read_node_ref()?);

    r.read_string()?;
    r.read_node_ref()?;
    r.advance(8)?;
    r.read_node_ref()?;
    r.read_node_ref()?;
    r.advance(4)?;
    for _ in 0..7 {
        r.read_string()?;
    }
    r.read_iso4()?;

    if version >= 3 && item_type == item_type::PICK_UP {
        fields.insert("mass", r.read_f32()?);
    }
    if !r.read_bool()? {
        r.read_node_ref()?;
    }

    if item_type != item_type::ORNAMENT {
        return Err(r.unsupported(ID, format!("item type {item_type}")));
    }

    if r.read_bool()? {
        r.advance(4)?;
        r.read_iso4()?;
    }
    r.advance(4)?;

    if version >= 1 {
        fields.insert("inventoryName", r.read_string()?);
        fields.insert("inventoryDescription", r.read_string()?);
        fields.insert("inventoryItemClass", r.read_i32()?);
        fields.insert("inventoryOccupation", r.read_i32()?);
    }
    if version >= 6 {
        r.read_node_ref()?;
    }
    Ok(fields)
}

fn read_entity_model(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    Ok(Fields::new()
        .with("phyModel", r.read_node_ref()?)
        .with("visModel", r.read_node_ref()?))
}

fn read_placement_param(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    let mut fields = Fields::new()
        .with("flags", r.read_i16()?)
        .with("cubeCenter", r.read_vec3()?);
    for name in [
        "cubeSize",
        "gridSnapHStep",
        "gridSnapVStep",
        "gridSnapHOffset",
        "gridSnapVOffset",
        "flyVStep",
        "flyVOffset",
        "pivotSnapDistance",
    ] {
        fields.insert(name, r.read_f32()?);
    }
    Ok(fields)
}

fn read_pivots(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new()
        .with("pivotPositions", r.read_list(|r| r.read_vec3())?)
        .with("pivotRotations", r.read_list(|r| r.read_quat())?))
}

fn read_block_item(r: &mut Reader<'_>) -> Result<Fields> {
    r.advance(4)?; // version
    let fields = Fields::new()
        .with("archeTypeBlockInfoId", r.read_lookback()?)
        .with("archeTypeBlockInfoCollectionId", r.read_lookback()?);
    let variants = r.read_list(|r| {
        Ok(Fields::new()
            .with("key", r.read_i32()?)
            .with("value", r.read_node_ref()?))
    })?;
    Ok(fields.with("customizedVariants", variants))
}

fn read_tree_generator(r: &mut Reader<'_>) -> Result<Fields> {
    Ok(Fields::new().with("version", r.read_i32()?))
}
