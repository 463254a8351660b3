use registrar_registry::RegistryError;
use registrar_replication::SnapshotError;
use thiserror::Error;

/// Errors returned by [`crate::Registrar`] registration calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrarError {
    /// Validation or duplicate check failed; nothing was written.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// A block could not be captured for replication; nothing was written.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
