#![warn(missing_docs)]
//! Core primitives shared across the registrar workspace.

pub mod definition;
pub mod ids;
pub mod namespace;

pub use definition::{
    BlockDefinition, BlockStateData, CodecValue, Definition, DefinitionKind, ItemDefinition,
    PersistedForm, SavedItemData, Signature, StateValue, ValueKind,
};
pub use ids::{IdSpaceExhausted, IdentifierAllocator, RuntimeId, TypeId};
pub use namespace::{
    normalize_name, KeyPart, Namespace, NamespaceError, DEFAULT_NAMESPACE, MAX_KEY_LEN,
};
