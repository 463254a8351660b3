use std::collections::BTreeMap;

use registrar_core::{Definition, TypeId};

use crate::RegistryError;

/// Authoritative map from type id to definition for one kind.
pub struct DefinitionStore<D: Definition> {
    definitions: BTreeMap<TypeId, D>,
}

impl<D: Definition> DefinitionStore<D> {
    /// Empty store.
    pub fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Fail with [`RegistryError::DuplicateRegistration`] if `type_id` is
    /// taken and `force` is not set. Never mutates.
    pub fn check(&self, type_id: TypeId, force: bool) -> Result<(), RegistryError> {
        if !force && self.definitions.contains_key(&type_id) {
            return Err(RegistryError::DuplicateRegistration {
                kind: D::KIND,
                type_id,
            });
        }
        Ok(())
    }

    /// Insert `definition`, refusing to overwrite unless `force` is set.
    ///
    /// Returns the definition that was replaced, if any.
    pub fn put(&mut self, definition: D, force: bool) -> Result<Option<D>, RegistryError> {
        self.check(definition.type_id(), force)?;
        Ok(self.replace(definition))
    }

    /// Insert `definition` unconditionally, returning the one it replaced.
    pub fn replace(&mut self, definition: D) -> Option<D> {
        self.definitions.insert(definition.type_id(), definition)
    }

    /// Look up a definition by type id.
    pub fn get(&self, type_id: TypeId) -> Option<&D> {
        self.definitions.get(&type_id)
    }

    /// Whether `type_id` is registered.
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.definitions.contains_key(&type_id)
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions ordered by type id.
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.definitions.values()
    }
}

impl<D: Definition> Default for DefinitionStore<D> {
    fn default() -> Self {
        Self::new()
    }
}
