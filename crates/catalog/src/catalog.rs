use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use registrar_core::{normalize_name, RuntimeId};
use tracing::{debug, warn};

use crate::RawCatalogEntry;

/// A vanilla item as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Key as written in the catalog file (e.g. `minecraft:iron_sword`).
    pub name: String,
    /// Network runtime id.
    pub runtime_id: RuntimeId,
    /// Whether the item is driven by component data.
    pub component_based: bool,
}

/// Immutable name → runtime id table for vanilla items.
///
/// Keys are stored normalized (see [`normalize_name`]) and queries are
/// normalized the same way.
#[derive(Debug, Clone, Default)]
pub struct VanillaCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl VanillaCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from parsed file entries. Later keys win when two normalize alike.
    pub fn from_raw(raw: BTreeMap<String, RawCatalogEntry>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(name, entry)| {
                let key = normalize_name(&name);
                let entry = CatalogEntry {
                    name,
                    runtime_id: RuntimeId(entry.runtime_id),
                    component_based: entry.component_based,
                };
                (key, entry)
            })
            .collect();
        Self { entries }
    }

    /// Runtime id of the vanilla item called `name`.
    pub fn lookup(&self, name: &str) -> Option<RuntimeId> {
        self.entry(name).map(|e| e.runtime_id)
    }

    /// Full catalog entry for `name`.
    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&normalize_name(name))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A catalog read from disk on first use and cached afterwards.
///
/// A missing or malformed file is logged and treated as an empty catalog, so
/// lookups degrade to `None` instead of failing.
#[derive(Debug)]
pub struct LazyCatalog {
    path: PathBuf,
    cell: OnceLock<VanillaCatalog>,
}

impl LazyCatalog {
    /// Defer loading `path` until the first lookup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Wrap an already loaded catalog.
    pub fn preloaded(catalog: VanillaCatalog) -> Self {
        Self {
            path: PathBuf::new(),
            cell: OnceLock::from(catalog),
        }
    }

    /// Path the catalog is read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file has been read yet.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The catalog, loading it if this is the first call.
    pub fn get(&self) -> &VanillaCatalog {
        self.cell.get_or_init(|| match crate::catalog_from_file(&self.path) {
            Ok(catalog) => {
                debug!(path = %self.path.display(), entries = catalog.len(), "Loaded item catalog");
                catalog
            }
            Err(err) => {
                warn!("Failed to load {}: {err}. Using an empty catalog", self.path.display());
                VanillaCatalog::empty()
            }
        })
    }

    /// Runtime id of the vanilla item called `name`.
    pub fn lookup(&self, name: &str) -> Option<RuntimeId> {
        self.get().lookup(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_from_str;

    const CATALOG: &str = r#"{
        "minecraft:iron_sword": { "runtime_id": 307, "component_based": false },
        "minecraft:stone": { "runtime_id": 1 },
        "minecraft:hard_glass": { "runtime_id": -253 }
    }"#;

    #[test]
    fn normalizes_queries_and_keys() {
        let catalog = catalog_from_str(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.lookup("Minecraft:Iron_Sword"), Some(RuntimeId(307)));
        assert_eq!(catalog.lookup("iron sword"), Some(RuntimeId(307)));
        assert_eq!(catalog.lookup("hard_glass"), Some(RuntimeId(-253)));
        assert_eq!(catalog.lookup("diamond"), None);
        assert_eq!(catalog.entry("stone").unwrap().name, "minecraft:stone");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(catalog_from_str("{ not json").is_err());
        assert!(catalog_from_str(r#"{ "minecraft:x": { "runtime_id": "one" } }"#).is_err());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let lazy = LazyCatalog::new("/definitely/not/here/required_item_list.json");
        assert!(!lazy.is_loaded());
        assert_eq!(lazy.lookup("stone"), None);
        assert!(lazy.is_loaded());
        assert!(lazy.get().is_empty());
    }

    #[test]
    fn preloaded_skips_disk() {
        let lazy = LazyCatalog::preloaded(catalog_from_str(CATALOG).unwrap());
        assert!(lazy.is_loaded());
        assert_eq!(lazy.lookup("stone"), Some(RuntimeId(1)));
    }
}
