#![warn(missing_docs)]
//! Vanilla runtime-id catalog: schema, loading and normalized lookup.

mod catalog;
mod loader;

pub use catalog::{CatalogEntry, LazyCatalog, VanillaCatalog};
pub use loader::{catalog_from_file, catalog_from_str};

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// One entry of the host's `required_item_list.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogEntry {
    /// Network runtime id for the item.
    pub runtime_id: i32,
    /// Whether the item is driven by component data.
    #[serde(default)]
    pub component_based: bool,
}

/// Errors emitted while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading the catalog file.
    #[error("failed to read item catalog: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse item catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Parse a JSON object of `"minecraft:name": { "runtime_id": .. }` entries.
pub fn load_entries_from_str(input: &str) -> Result<BTreeMap<String, RawCatalogEntry>, CatalogError> {
    Ok(serde_json::from_str(input)?)
}
