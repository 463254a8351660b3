use std::collections::HashMap;

use registrar_core::{Definition, Namespace, RuntimeId, TypeId};
use tracing::warn;

/// Bidirectional namespace ↔ runtime id table used by the wire layer.
///
/// Binding is last-write-wins on both sides. Rebinding a runtime id that
/// another namespace still points at leaves that namespace resolving to the
/// new definition; this is logged, not prevented.
pub struct NameDictionary<D: Definition> {
    name_to_id: HashMap<Namespace, (RuntimeId, TypeId)>,
    id_to_definition: HashMap<RuntimeId, D>,
}

impl<D: Definition> NameDictionary<D> {
    /// Empty dictionary.
    pub fn new() -> Self {
        Self {
            name_to_id: HashMap::new(),
            id_to_definition: HashMap::new(),
        }
    }

    /// Bind `namespace` to `runtime_id` and `runtime_id` to `definition`.
    ///
    /// Returns the definition previously bound to `runtime_id`.
    pub fn bind(&mut self, namespace: Namespace, runtime_id: RuntimeId, definition: D) -> Option<D> {
        if let Some((old, _)) = self.name_to_id.get(&namespace) {
            if *old != runtime_id {
                warn!(kind = %D::KIND, %namespace, old = %old, new = %runtime_id, "Rebinding namespace");
            }
        }
        let owner = definition.type_id();
        let previous = self.id_to_definition.insert(runtime_id, definition);
        if let Some(prev) = &previous {
            warn!(kind = %D::KIND, %runtime_id, replaced = prev.name(), "Runtime id rebound");
        }
        self.name_to_id.insert(namespace, (runtime_id, owner));
        previous
    }

    /// Undo what `type_id` bound under `namespace` and `runtime_id`.
    ///
    /// Either side that a later bind handed to another definition stays.
    /// Returns whether anything was removed.
    pub fn unbind(&mut self, namespace: &Namespace, runtime_id: RuntimeId, type_id: TypeId) -> bool {
        let mut removed = false;
        if self.name_owner(namespace) == Some(type_id) {
            self.name_to_id.remove(namespace);
            removed = true;
        }
        if self.id_to_definition.get(&runtime_id).map(Definition::type_id) == Some(type_id) {
            self.id_to_definition.remove(&runtime_id);
            removed = true;
        }
        removed
    }

    /// Runtime id bound to `namespace`.
    pub fn runtime_id(&self, namespace: &Namespace) -> Option<RuntimeId> {
        self.name_to_id.get(namespace).map(|(id, _)| *id)
    }

    /// Type id of the definition that last bound `namespace`.
    pub fn name_owner(&self, namespace: &Namespace) -> Option<TypeId> {
        self.name_to_id.get(namespace).map(|(_, owner)| *owner)
    }

    /// Definition bound to `runtime_id`.
    pub fn definition(&self, runtime_id: RuntimeId) -> Option<&D> {
        self.id_to_definition.get(&runtime_id)
    }

    /// Number of bound namespaces.
    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }
}

impl<D: Definition> Default for NameDictionary<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_core::{ItemDefinition, TypeId};

    #[test]
    fn binds_both_directions() {
        let mut dict = NameDictionary::new();
        let ns = Namespace::derive("Ruby");
        dict.bind(ns.clone(), RuntimeId(900), ItemDefinition::new(TypeId(1), "Ruby"));
        assert_eq!(dict.runtime_id(&ns), Some(RuntimeId(900)));
        assert_eq!(dict.definition(RuntimeId(900)).unwrap().name, "Ruby");
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn colliding_runtime_ids_silently_replace() {
        let mut dict = NameDictionary::new();
        let ruby = Namespace::derive("Ruby");
        let jade = Namespace::derive("Jade");
        dict.bind(ruby.clone(), RuntimeId(900), ItemDefinition::new(TypeId(1), "Ruby"));
        let replaced = dict.bind(jade.clone(), RuntimeId(900), ItemDefinition::new(TypeId(2), "Jade"));

        assert_eq!(replaced.map(|d| d.name), Some("Ruby".to_string()));
        // Both names still resolve, but the id now only knows about Jade.
        assert_eq!(dict.runtime_id(&ruby), Some(RuntimeId(900)));
        assert_eq!(dict.runtime_id(&jade), Some(RuntimeId(900)));
        assert_eq!(dict.definition(RuntimeId(900)).unwrap().name, "Jade");
    }

    #[test]
    fn rebinding_a_namespace_moves_it() {
        let mut dict = NameDictionary::new();
        let ns = Namespace::derive("Ruby");
        dict.bind(ns.clone(), RuntimeId(1), ItemDefinition::new(TypeId(1), "Ruby"));
        dict.bind(ns.clone(), RuntimeId(2), ItemDefinition::new(TypeId(1), "Ruby"));
        assert_eq!(dict.runtime_id(&ns), Some(RuntimeId(2)));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn unbind_removes_both_sides() {
        let mut dict = NameDictionary::new();
        let ns = Namespace::derive("Ruby");
        dict.bind(ns.clone(), RuntimeId(5), ItemDefinition::new(TypeId(1), "Ruby"));
        assert!(dict.unbind(&ns, RuntimeId(5), TypeId(1)));
        assert!(dict.definition(RuntimeId(5)).is_none());
        assert!(dict.is_empty());
        assert!(!dict.unbind(&ns, RuntimeId(5), TypeId(1)));
    }

    #[test]
    fn unbind_skips_entries_taken_over_by_other_ids() {
        let mut dict = NameDictionary::new();
        let gem = Namespace::derive("Gem");
        let ruby = Namespace::derive("Ruby");
        dict.bind(gem.clone(), RuntimeId(1), ItemDefinition::new(TypeId(1), "Ruby"));
        dict.bind(gem.clone(), RuntimeId(2), ItemDefinition::new(TypeId(2), "Jade"));
        dict.bind(ruby.clone(), RuntimeId(2), ItemDefinition::new(TypeId(1), "Ruby"));
        dict.bind(Namespace::derive("Jade"), RuntimeId(2), ItemDefinition::new(TypeId(2), "Jade"));

        // Type 1 only still owns the `ruby` name and runtime id 1.
        assert!(dict.unbind(&gem, RuntimeId(1), TypeId(1)));
        assert!(dict.definition(RuntimeId(1)).is_none());
        assert_eq!(dict.runtime_id(&gem), Some(RuntimeId(2)));
        assert_eq!(dict.name_owner(&gem), Some(TypeId(2)));

        assert!(dict.unbind(&ruby, RuntimeId(2), TypeId(1)));
        assert_eq!(dict.runtime_id(&ruby), None);
        assert_eq!(dict.definition(RuntimeId(2)).unwrap().name, "Jade");
    }
}
