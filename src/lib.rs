#![warn(missing_docs)]
//! bedrock-registrar - custom item and block registration for Bedrock-style servers
//!
//! A [`Registrar`] keeps the definition stores, codec registries and name
//! dictionaries for items and blocks in step, and replays block registrations
//! into worker threads that keep their own lookup caches.

mod config;
mod error;
mod registrar;

pub use config::{RegistrarConfig, ReplicationConfig};
pub use error::RegistrarError;
pub use registrar::{RegisterOptions, RegistrationStage, Registrar, SharedRegistrar};

pub use registrar_catalog::{CatalogEntry, CatalogError, LazyCatalog, VanillaCatalog};
pub use registrar_core::{
    normalize_name, BlockDefinition, BlockStateData, CodecValue, Definition, DefinitionKind,
    ItemDefinition, KeyPart, Namespace, NamespaceError, RuntimeId, SavedItemData, Signature, StateValue, TypeId, ValueKind,
};
pub use registrar_registry::{Callback, CallbackRole, CodecError, RegistryError};
pub use registrar_replication::{
    ReplicaStats, ReplicationError, ReplicationHandle, ReplicationReport, ReplicationWorker,
};
