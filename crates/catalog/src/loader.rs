use std::fs;
use std::path::Path;

use crate::{CatalogError, VanillaCatalog};

/// Load a catalog from the provided JSON file path.
pub fn catalog_from_file(path: &Path) -> Result<VanillaCatalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

/// Load a catalog from an in-memory JSON string.
pub fn catalog_from_str(input: &str) -> Result<VanillaCatalog, CatalogError> {
    let raw = crate::load_entries_from_str(input)?;
    Ok(VanillaCatalog::from_raw(raw))
}
