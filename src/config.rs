use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::warn;

use registrar_core::DEFAULT_NAMESPACE;

const DEFAULT_CONFIG_PATH: &str = "config/registrar.toml";
const DEFAULT_CATALOG_PATH: &str = "bedrock_data/required_item_list.json";

/// Registrar settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrarConfig {
    /// Highest item type id reserved for vanilla content.
    pub first_unused_item_id: u32,
    /// Highest block type id reserved for vanilla content.
    pub first_unused_block_id: u32,
    /// Namespace prefix used for derived and bare keys.
    pub default_namespace: String,
    /// Vanilla `required_item_list.json`, read on first lookup.
    pub catalog_path: PathBuf,
    /// Replication worker settings.
    pub replication: ReplicationConfig,
}

/// Replication worker settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplicationConfig {
    /// Tasks that may queue before `submit` blocks.
    pub queue_capacity: usize,
    /// Worker thread name.
    pub worker_name: String,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            first_unused_item_id: 2000,
            first_unused_block_id: 1000,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            replication: ReplicationConfig::default(),
        }
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            worker_name: "registrar-replication".to_string(),
        }
    }
}

impl RegistrarConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<RegistrarConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    RegistrarConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!(
                        "Registrar config not found at {}. Using defaults",
                        path.display()
                    );
                }
                RegistrarConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
