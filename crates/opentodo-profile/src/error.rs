use std::fmt;

use opentodo_core::{asset::AssetError, codec::CodecError, storage::SlotStoreError};
use thiserror::Error;

/// Kind of entity a mutation addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    TaskList,
    TaskGroup,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Project => "project",
            EntityKind::TaskList => "task list",
            EntityKind::TaskGroup => "task group",
            EntityKind::Task => "task",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// `MalformedJson` / `InvalidShape` from decoding a document.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The storage medium rejected a read or write.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] SlotStoreError),
    /// Background image bytes could not be read.
    #[error("background asset unreadable: {0}")]
    AssetDecodeFailed(#[from] AssetError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("profile store used before init")]
    Uninitialized,
}

impl StoreError {
    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Short human-readable category for user notifications.
    pub fn category(&self) -> &'static str {
        match self {
            StoreError::Codec(CodecError::MalformedJson(_)) => "malformed json",
            StoreError::Codec(CodecError::InvalidShape { .. }) => "invalid profile",
            StoreError::Codec(CodecError::Encode(_)) => "encoding failure",
            StoreError::StorageUnavailable(_) => "storage unavailable",
            StoreError::AssetDecodeFailed(_) => "unreadable image",
            StoreError::NotFound { .. } => "not found",
            StoreError::Uninitialized => "not initialized",
        }
    }
}
