use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use opentodo_core::storage::{SlotStore, SlotStoreError};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

const SLOT_EXTENSION: &str = "slot";

/// File-backed slot store. Every slot is a file `<root>/<name>.slot`, replaced
/// atomically on write so a crash never leaves a half-written slot.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    root: PathBuf,
    quota: Option<usize>,
}

impl FileSlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            quota: None,
        }
    }

    /// Reject any single slot write larger than `limit` bytes.
    pub fn with_quota(mut self, limit: usize) -> Self {
        self.quota = Some(limit);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{SLOT_EXTENSION}", file_stem(key)))
    }
}

#[async_trait]
impl SlotStore for FileSlotStore {
    #[instrument(skip_all, fields(key))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SlotStoreError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_err(err)),
        }
    }

    #[instrument(skip_all, fields(key, len = value.len()))]
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotStoreError> {
        if let Some(limit) = self.quota {
            if value.len() > limit {
                return Err(SlotStoreError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }
        let path = self.path_for(key);
        write_atomic(&path, value)?;
        debug!(path = %path.display(), "slot written");
        Ok(())
    }

    #[instrument(skip_all, fields(key))]
    async fn delete(&self, key: &str) -> Result<(), SlotStoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_err(err)),
        }
    }
}

fn write_atomic(path: &Path, value: &[u8]) -> Result<(), SlotStoreError> {
    let parent = path.parent().ok_or_else(|| SlotStoreError::Storage {
        reason: "invalid storage path".to_string(),
    })?;
    fs::create_dir_all(parent).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage_err)?;
    tmp.write_all(value).map_err(storage_err)?;
    tmp.flush().map_err(storage_err)?;
    tmp.as_file().sync_all().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}

/// Plain keys keep their name on disk; anything else is base64-encoded behind
/// a `~` so the two forms never collide.
fn file_stem(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        key.to_string()
    } else {
        format!("~{}", URL_SAFE_NO_PAD.encode(key))
    }
}

fn storage_err<E: ToString>(err: E) -> SlotStoreError {
    SlotStoreError::Storage {
        reason: err.to_string(),
    }
}
