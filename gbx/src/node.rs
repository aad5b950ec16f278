//! Decoded node graph
//!
//! Nodes live in a [`NodeArena`] and refer to each other by [`NodeId`]. A node is a
//! class id plus an insertion-ordered record of named [`Value`]s, merged together
//! from the node's chunks.

use std::ops::Index;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::document::Gbx;
use crate::lookback::Meta;
use crate::types::{Color, FileRef, Int2, Int3, Int4, Iso4, Quat, Transform, Vec2, Vec3};

/// Index of a node in its [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Node {
    pub class_id: u32,
    pub fields: Fields,
}

impl Node {
    pub fn new(class_id: u32) -> Self {
        Self {
            class_id,
            fields: Fields::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Node referenced by field `name`, if set and non-null
    pub fn node_ref(&self, name: &str) -> Option<NodeId> {
        match self.get(name) {
            Some(Value::Node(id)) => *id,
            _ => None,
        }
    }

    /// Blocks placed in the map grid
    pub fn blocks(&self) -> &[Block] {
        match self.get("blocks") {
            Some(Value::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// Blocks baked into the map by the editor
    pub fn baked_blocks(&self) -> &[Block] {
        match self.get("bakedBlocks") {
            Some(Value::Blocks(blocks)) => blocks,
            _ => &[],
        }
    }

    /// Free-placed items, in file order
    pub fn anchored_objects(&self) -> Vec<NodeId> {
        self.node_list("anchoredObjects")
    }

    /// Successfully decoded embedded archive entries
    pub fn embedded_data(&self) -> &[EmbeddedEntry] {
        match self.get("embeddedData") {
            Some(Value::Embedded(entries)) => entries,
            _ => &[],
        }
    }

    /// Embedded archive entries that failed to decode
    pub fn embedded_failures(&self) -> &[EmbeddedFailure] {
        match self.get("embeddedFailures") {
            Some(Value::EmbeddedFailures(failures)) => failures,
            _ => &[],
        }
    }

    pub fn samples(&self) -> &[Sample] {
        match self.get("samples") {
            Some(Value::Samples(samples)) => samples,
            _ => &[],
        }
    }

    /// Non-null node references in the list field `name`
    pub fn node_list(&self, name: &str) -> Vec<NodeId> {
        match self.get(name) {
            Some(Value::List(items)) => items.iter().filter_map(Value::as_node).collect(),
            _ => Vec::new(),
        }
    }
}

/// Insertion-ordered named values
///
/// Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<(&'static str, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, name: &'static str, value: impl Into<Value>) {
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder form of [`Fields::insert`]
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert only when `value` is present
    pub fn with_opt<T: Into<Value>>(mut self, name: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.iter_mut().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Merge `other` into `self`; values from `other` win on a name clash.
    pub fn merge(&mut self, other: Fields) {
        for (name, value) in other.0 {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A decoded field value
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    I64(i64),
    U64(u64),
    F32(f32),
    String(String),
    Bytes(Vec<u8>),
    Vec2(Vec2),
    Vec3(Vec3),
    Int2(Int2),
    Int3(Int3),
    Int4(Int4),
    Quat(Quat),
    Color(Color),
    Iso4(Iso4),
    Transform(Transform),
    FileRef(FileRef),
    Meta(Meta),
    /// Reference to another node; `None` is a null reference
    Node(Option<NodeId>),
    List(Vec<Value>),
    Record(Fields),
    Blocks(Vec<Block>),
    Samples(Vec<Sample>),
    MacroBlockInstances(Vec<MacroBlockInstance>),
    Embedded(Vec<EmbeddedEntry>),
    EmbeddedFailures(Vec<EmbeddedFailure>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned or non-negative integer widened to `u32`
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U8(v) => Some(*v as u32),
            Self::U16(v) => Some(*v as u32),
            Self::U32(v) => Some(*v),
            Self::I16(v) => u32::try_from(*v).ok(),
            Self::I32(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::U8(v) => Some(*v as i32),
            Self::U16(v) => Some(*v as i32),
            Self::I16(v) => Some(*v as i32),
            Self::I32(v) => Some(*v),
            Self::U32(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            other => other.as_i32().map(i64::from),
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Non-null node reference
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(id) => *id,
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Fields> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_meta(&self) -> Option<&Meta> {
        match self {
            Self::Meta(meta) => Some(meta),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    u8 => U8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    String => String,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Int2 => Int2,
    Int3 => Int3,
    Int4 => Int4,
    Quat => Quat,
    Color => Color,
    Iso4 => Iso4,
    Transform => Transform,
    FileRef => FileRef,
    Meta => Meta,
    Fields => Record,
    Option<NodeId> => Node,
    Vec<Block> => Blocks,
    Vec<Sample> => Samples,
    Vec<MacroBlockInstance> => MacroBlockInstances,
    Vec<EmbeddedEntry> => Embedded,
    Vec<EmbeddedFailure> => EmbeddedFailures,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(Some(id))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

/// Block difficulty colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DifficultyColor {
    Default,
    White,
    Green,
    Blue,
    Red,
    Black,
    Other(u8),
}

impl From<u8> for DifficultyColor {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Default,
            1 => Self::White,
            2 => Self::Green,
            3 => Self::Blue,
            4 => Self::Red,
            5 => Self::Black,
            other => Self::Other(other),
        }
    }
}

/// A block in the map grid (or baked by the editor)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub name: String,
    /// Quarter turns: north, east, south, west
    pub rotation: u8,
    pub coord: Int3,
    pub flags: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skin: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_parameters: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<DifficultyColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lightmap_quality: Option<u8>,
    /// Index into the owning node's `macroBlockInstances`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_block_instance: Option<usize>,
}

/// Group of blocks and items placed together from one macroblock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacroBlockInstance {
    pub id: i32,
    pub flags: Option<i32>,
}

/// One recorded vehicle state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sample {
    /// Milliseconds from the start of the recording
    pub timestamp: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steer: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brake: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear: Option<f32>,
}

/// Decoded file from an embedded archive
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedEntry {
    pub name: String,
    pub gbx: Gbx,
}

/// Embedded archive entry that could not be decoded
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddedFailure {
    pub name: String,
    pub error: String,
}

/// Owner of every node decoded in one session
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an empty node and return its id
    pub fn reserve(&mut self, class_id: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(class_id));
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Move a node out for decoding, leaving an empty node of the same class behind
    pub(crate) fn take(&mut self, id: NodeId) -> Node {
        match self.nodes.get_mut(id.index()) {
            Some(slot) => {
                let class_id = slot.class_id;
                std::mem::replace(slot, Node::new(class_id))
            }
            None => Node::default(),
        }
    }

    pub(crate) fn restore(&mut self, id: NodeId, node: Node) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = node;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}
