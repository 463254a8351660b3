use std::collections::HashMap;

use registrar_core::{normalize_name, Definition, TypeId};

/// Display-name lookup that hands out fresh clones of registered definitions.
///
/// Names are normalized with [`normalize_name`], so `"Ruby Block"`,
/// `"ruby_block"` and `"minecraft:ruby_block"` are the same alias.
pub struct AliasMap<D: Definition> {
    aliases: HashMap<String, D>,
}

impl<D: Definition> AliasMap<D> {
    /// Empty alias map.
    pub fn new() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Point `alias` at `definition`, replacing any previous target.
    pub fn override_alias(&mut self, alias: &str, definition: D) {
        self.aliases.insert(normalize_name(alias), definition);
    }

    /// Drop `alias` if it still points at `type_id`.
    pub fn remove_alias(&mut self, alias: &str, type_id: TypeId) -> Option<D> {
        let key = normalize_name(alias);
        if self.aliases.get(&key)?.type_id() != type_id {
            return None;
        }
        self.aliases.remove(&key)
    }

    /// A clone of the definition registered under `alias`.
    pub fn parse(&self, alias: &str) -> Option<D> {
        self.aliases.get(&normalize_name(alias)).cloned()
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether there are no aliases.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<D: Definition> Default for AliasMap<D> {
    fn default() -> Self {
        Self::new()
    }
}
