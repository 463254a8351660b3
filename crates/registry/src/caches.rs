use std::collections::HashMap;

use registrar_core::{BlockDefinition, Definition, Namespace, TypeId};
use tracing::debug;

use crate::{
    Callback, CodecRegistry, DefinitionStore, NameDictionary, RegistryError, ValidatedCodecs,
};

/// The block lookup structures one execution context needs: the definition
/// store, the state codecs and the state dictionary.
///
/// The registrar owns one set; every replication worker owns another. Both
/// go through the same write steps, so a forced overwrite leaves them
/// identical.
#[derive(Default)]
pub struct BlockCaches {
    /// Definitions by type id.
    pub store: DefinitionStore<BlockDefinition>,
    /// Block state serializers/deserializers.
    pub codecs: CodecRegistry<BlockDefinition>,
    /// Namespace ↔ state id.
    pub states: NameDictionary<BlockDefinition>,
    namespaces: HashMap<TypeId, Namespace>,
}

impl BlockCaches {
    /// Empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `block` into all three structures, overwriting whatever was
    /// there for its type id, namespace and state id.
    pub fn apply(
        &mut self,
        block: BlockDefinition,
        namespace: Namespace,
        serialize: Option<Callback>,
        deserialize: Option<Callback>,
    ) -> Result<(), RegistryError> {
        let codecs = CodecRegistry::<BlockDefinition>::validate(serialize, deserialize)?;
        self.apply_validated(block, namespace, codecs);
        Ok(())
    }

    /// [`BlockCaches::apply`] with callbacks that were already validated.
    pub fn apply_validated(
        &mut self,
        block: BlockDefinition,
        namespace: Namespace,
        codecs: ValidatedCodecs<BlockDefinition>,
    ) {
        let type_id = block.type_id();
        let state_id = block.state_id;
        self.replace_definition(block.clone());
        self.install_codecs(&namespace, &block, codecs);
        debug!(%type_id, %namespace, %state_id, "Applied block registration");
        self.bind_state(namespace, block);
    }

    /// Store `block`, first undoing the codecs and state binding that the
    /// previous registration of its type id made.
    ///
    /// Entries another type id has since taken over are left in place.
    pub fn replace_definition(&mut self, block: BlockDefinition) -> Option<BlockDefinition> {
        let type_id = block.type_id();
        let previous = self.store.replace(block)?;
        if let Some(old) = self.namespaces.remove(&type_id) {
            self.codecs.forget(type_id, &old);
            self.states.unbind(&old, previous.state_id, type_id);
        }
        Some(previous)
    }

    /// Install codecs for `block` under `namespace`.
    pub fn install_codecs(
        &mut self,
        namespace: &Namespace,
        block: &BlockDefinition,
        codecs: ValidatedCodecs<BlockDefinition>,
    ) {
        self.codecs.install(namespace, block, codecs);
    }

    /// Bind `namespace` to `block`'s state id and remember it for the next
    /// overwrite of the same type id.
    pub fn bind_state(&mut self, namespace: Namespace, block: BlockDefinition) {
        self.namespaces.insert(block.type_id(), namespace.clone());
        self.states.bind(namespace, block.state_id, block);
    }

    /// Namespace the block with `type_id` was registered under.
    pub fn namespace(&self, type_id: TypeId) -> Option<&Namespace> {
        self.namespaces.get(&type_id)
    }
}
