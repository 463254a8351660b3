#![warn(missing_docs)]
//! Definition stores, codec registries and name dictionaries.
//!
//! Each structure is generic over [`registrar_core::Definition`] so items and
//! blocks share one implementation. None of them lock; callers that share a
//! registry across threads must serialize access themselves.

mod aliases;
mod caches;
mod codec;
mod dictionary;
mod error;
mod store;

pub use aliases::AliasMap;
pub use caches::BlockCaches;
pub use codec::{Callback, CodecRegistry, ValidatedCodecs};
pub use dictionary::NameDictionary;
pub use error::{CallbackRole, CodecError, RegistryError};
pub use store::DefinitionStore;
