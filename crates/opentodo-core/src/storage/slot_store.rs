use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by slot storage implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotStoreError {
    /// The write would exceed the medium's per-slot quota.
    #[error("quota exceeded for slot {key}: {size} bytes > {limit} bytes")]
    QuotaExceeded {
        key: String,
        size: usize,
        limit: usize,
    },
    /// Underlying storage failure (medium disabled, I/O error, ...).
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Local key/value medium. Each individual write is assumed crash-safe.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Read a slot; `None` when it has never been written or was removed.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SlotStoreError>;

    /// Persist a value under a key, overwriting any existing entry.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotStoreError>;

    /// Remove a slot (idempotent).
    async fn delete(&self, key: &str) -> Result<(), SlotStoreError>;
}

/// Process-local slot store for tests and ephemeral sessions.
/// Clones share the same slots.
#[derive(Debug, Default, Clone)]
pub struct InMemorySlotStore {
    inner: Arc<Mutex<MemorySlots>>,
}

#[derive(Debug, Default)]
struct MemorySlots {
    slots: HashMap<String, Vec<u8>>,
    quota: Option<usize>,
}

impl InMemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects any single write larger than `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        let store = Self::default();
        store.set_quota(Some(limit));
        store
    }

    /// Change (or lift) the per-slot quota of this store and all its clones.
    pub fn set_quota(&self, limit: Option<usize>) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.quota = limit;
        }
    }

    /// Whether a slot currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .map(|guard| guard.slots.contains_key(key))
            .unwrap_or(false)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemorySlots>, SlotStoreError> {
        self.inner.lock().map_err(|err| SlotStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SlotStoreError> {
        let guard = self.lock()?;
        Ok(guard.slots.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), SlotStoreError> {
        let mut guard = self.lock()?;
        if let Some(limit) = guard.quota {
            if value.len() > limit {
                return Err(SlotStoreError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }
        guard.slots.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SlotStoreError> {
        let mut guard = self.lock()?;
        guard.slots.remove(key);
        Ok(())
    }
}
