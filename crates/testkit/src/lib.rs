#![warn(missing_docs)]
//! Shared fixtures for registrar tests.

use anyhow::Result;
use registrar_core::{BlockDefinition, ItemDefinition, RuntimeId, StateValue, TypeId};
use std::fs;
use std::path::{Path, PathBuf};

/// A small `required_item_list.json` in the host's format.
pub const SAMPLE_CATALOG: &str = r#"{
    "minecraft:iron_sword": { "runtime_id": 307, "component_based": false },
    "minecraft:stone": { "runtime_id": 1, "component_based": false },
    "minecraft:oak_planks": { "runtime_id": 5, "component_based": false },
    "minecraft:hard_glass": { "runtime_id": -253, "component_based": false }
}"#;

/// Install a `tracing` subscriber for test output.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// An item with default stack size.
pub fn sample_item(type_id: u32, name: &str) -> ItemDefinition {
    ItemDefinition::new(TypeId(type_id), name)
}

/// A block with a single `lit` state.
pub fn sample_block(type_id: u32, name: &str, state_id: i32) -> BlockDefinition {
    BlockDefinition::new(TypeId(type_id), name, RuntimeId(state_id))
        .with_state("lit", StateValue::Bool(false))
}

/// Write `contents` as `required_item_list.json` inside `dir`.
pub fn write_catalog(dir: &Path, contents: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("required_item_list.json");
    fs::write(&path, contents)?;
    Ok(path)
}
