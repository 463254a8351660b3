//! Item and block definitions plus the persisted forms they serialize to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::ids::{RuntimeId, TypeId};
use crate::namespace::Namespace;

/// Which registry a definition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefinitionKind {
    /// Inventory items.
    Item,
    /// Placeable blocks.
    Block,
}

impl DefinitionKind {
    /// Shape every serializer for this kind must have.
    pub fn serialize_signature(self) -> Signature {
        match self {
            DefinitionKind::Item => Signature::new(ValueKind::Item, ValueKind::SavedItem),
            DefinitionKind::Block => Signature::new(ValueKind::Block, ValueKind::BlockState),
        }
    }

    /// Shape every deserializer for this kind must have.
    pub fn deserialize_signature(self) -> Signature {
        let ser = self.serialize_signature();
        Signature::new(ser.output, ser.input)
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionKind::Item => write!(f, "item"),
            DefinitionKind::Block => write!(f, "block"),
        }
    }
}

/// Discriminant of a [`CodecValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`ItemDefinition`]
    Item,
    /// [`BlockDefinition`]
    Block,
    /// [`SavedItemData`]
    SavedItem,
    /// [`BlockStateData`]
    BlockState,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ValueKind::Item => "Item",
            ValueKind::Block => "Block",
            ValueKind::SavedItem => "SavedItemData",
            ValueKind::BlockState => "BlockStateData",
        };
        f.write_str(label)
    }
}

/// Declared input/output shape of a codec callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Kind of value the callback accepts.
    pub input: ValueKind,
    /// Kind of value the callback produces.
    pub output: ValueKind,
}

impl Signature {
    /// Build a signature.
    pub const fn new(input: ValueKind, output: ValueKind) -> Self {
        Self { input, output }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) -> {}", self.input, self.output)
    }
}

/// Type-erased value passed through codec callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecValue {
    /// An item definition.
    Item(ItemDefinition),
    /// A block definition.
    Block(BlockDefinition),
    /// Persisted item form.
    SavedItem(SavedItemData),
    /// Persisted block state form.
    BlockState(BlockStateData),
}

impl CodecValue {
    /// Discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            CodecValue::Item(_) => ValueKind::Item,
            CodecValue::Block(_) => ValueKind::Block,
            CodecValue::SavedItem(_) => ValueKind::SavedItem,
            CodecValue::BlockState(_) => ValueKind::BlockState,
        }
    }
}

/// Something a definition serializes to and deserializes from.
pub trait PersistedForm: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// The [`ValueKind`] this form travels as.
    const VALUE_KIND: ValueKind;

    /// Key used to find the deserializer for this form.
    fn namespace(&self) -> &Namespace;

    /// Smallest valid form carrying only `namespace`.
    fn minimal(namespace: Namespace) -> Self;

    /// Wrap into a [`CodecValue`].
    fn into_value(self) -> CodecValue;

    /// Unwrap from a [`CodecValue`], returning the value untouched on mismatch.
    fn from_value(value: CodecValue) -> Result<Self, CodecValue>;
}

/// A registrable item or block.
pub trait Definition: Clone + fmt::Debug + Send + Sync + 'static {
    /// Persisted form produced by this definition's serializer.
    type Persisted: PersistedForm;

    /// Registry this definition lives in.
    const KIND: DefinitionKind;

    /// The [`ValueKind`] this definition travels as.
    const VALUE_KIND: ValueKind;

    /// Stable numeric identity within [`Definition::KIND`].
    fn type_id(&self) -> TypeId;

    /// Human-readable display name (e.g. "Stone Block").
    fn name(&self) -> &str;

    /// Wrap into a [`CodecValue`].
    fn into_value(self) -> CodecValue;

    /// Unwrap from a [`CodecValue`], returning the value untouched on mismatch.
    fn from_value(value: CodecValue) -> Result<Self, CodecValue>;
}

/// A custom or vanilla item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Type id within the item registry.
    pub type_id: TypeId,
    /// Display name.
    pub name: String,
    /// Maximum stack size.
    pub max_stack_size: u8,
    /// Free-form properties carried for plugin use.
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl ItemDefinition {
    /// Item with a default stack size of 64 and no properties.
    pub fn new(type_id: TypeId, name: impl Into<String>) -> Self {
        Self {
            type_id,
            name: name.into(),
            max_stack_size: 64,
            properties: BTreeMap::new(),
        }
    }

    /// Override the maximum stack size.
    pub fn with_max_stack_size(mut self, size: u8) -> Self {
        self.max_stack_size = size;
        self
    }

    /// Attach a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl Definition for ItemDefinition {
    type Persisted = SavedItemData;
    const KIND: DefinitionKind = DefinitionKind::Item;
    const VALUE_KIND: ValueKind = ValueKind::Item;

    fn type_id(&self) -> TypeId {
        self.type_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_value(self) -> CodecValue {
        CodecValue::Item(self)
    }

    fn from_value(value: CodecValue) -> Result<Self, CodecValue> {
        match value {
            CodecValue::Item(item) => Ok(item),
            other => Err(other),
        }
    }
}

/// Value of a single block state property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateValue {
    /// Boolean property (`open_bit`).
    Bool(bool),
    /// Integer property (`age`).
    Int(i32),
    /// String property (`facing_direction`).
    String(String),
}

/// A custom or vanilla block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    /// Type id within the block registry.
    pub type_id: TypeId,
    /// Display name.
    pub name: String,
    /// Network state id; doubles as the block's runtime id in the state dictionary.
    pub state_id: RuntimeId,
    /// Default state properties.
    #[serde(default)]
    pub states: BTreeMap<String, StateValue>,
}

impl BlockDefinition {
    /// Block with no state properties.
    pub fn new(type_id: TypeId, name: impl Into<String>, state_id: RuntimeId) -> Self {
        Self {
            type_id,
            name: name.into(),
            state_id,
            states: BTreeMap::new(),
        }
    }

    /// Attach a state property.
    pub fn with_state(mut self, key: impl Into<String>, value: StateValue) -> Self {
        self.states.insert(key.into(), value);
        self
    }
}

impl Definition for BlockDefinition {
    type Persisted = BlockStateData;
    const KIND: DefinitionKind = DefinitionKind::Block;
    const VALUE_KIND: ValueKind = ValueKind::Block;

    fn type_id(&self) -> TypeId {
        self.type_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn into_value(self) -> CodecValue {
        CodecValue::Block(self)
    }

    fn from_value(value: CodecValue) -> Result<Self, CodecValue> {
        match value {
            CodecValue::Block(block) => Ok(block),
            other => Err(other),
        }
    }
}

/// Persisted item form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItemData {
    /// Key the item is saved under.
    pub name: Namespace,
    /// Legacy damage/meta value.
    pub meta: i16,
    /// Block state when the item places a block.
    pub block: Option<BlockStateData>,
    /// Extra tag data.
    #[serde(default)]
    pub tag: BTreeMap<String, String>,
}

impl SavedItemData {
    /// Minimal form carrying only a name.
    pub fn new(name: Namespace) -> Self {
        Self {
            name,
            meta: 0,
            block: None,
            tag: BTreeMap::new(),
        }
    }
}

impl PersistedForm for SavedItemData {
    const VALUE_KIND: ValueKind = ValueKind::SavedItem;

    fn namespace(&self) -> &Namespace {
        &self.name
    }

    fn minimal(namespace: Namespace) -> Self {
        Self::new(namespace)
    }

    fn into_value(self) -> CodecValue {
        CodecValue::SavedItem(self)
    }

    fn from_value(value: CodecValue) -> Result<Self, CodecValue> {
        match value {
            CodecValue::SavedItem(data) => Ok(data),
            other => Err(other),
        }
    }
}

/// Persisted block state form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStateData {
    /// Key the block is saved under.
    pub name: Namespace,
    /// State properties.
    #[serde(default)]
    pub states: BTreeMap<String, StateValue>,
}

impl BlockStateData {
    /// State data with no properties.
    pub fn new(name: Namespace) -> Self {
        Self {
            name,
            states: BTreeMap::new(),
        }
    }
}

impl PersistedForm for BlockStateData {
    const VALUE_KIND: ValueKind = ValueKind::BlockState;

    fn namespace(&self) -> &Namespace {
        &self.name
    }

    fn minimal(namespace: Namespace) -> Self {
        Self::new(namespace)
    }

    fn into_value(self) -> CodecValue {
        CodecValue::BlockState(self)
    }

    fn from_value(value: CodecValue) -> Result<Self, CodecValue> {
        match value {
            CodecValue::BlockState(data) => Ok(data),
            other => Err(other),
        }
    }
}
