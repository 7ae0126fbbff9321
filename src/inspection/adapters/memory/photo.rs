//! In-memory photo store for tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::super::hex_sha256;
use crate::inspection::domain::PhotoHandle;
use crate::inspection::ports::{PhotoStore, PhotoStoreError, PhotoStoreResult, StoredPhoto};

/// Thread-safe in-memory photo store tracking stored handles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPhotoStore {
    handles: Arc<RwLock<HashSet<PhotoHandle>>>,
}

impl InMemoryPhotoStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a handle is currently stored.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStoreError::Storage`] when the store lock is poisoned.
    pub fn contains(&self, handle: &PhotoHandle) -> PhotoStoreResult<bool> {
        let handles = self
            .handles
            .read()
            .map_err(|err| PhotoStoreError::storage(std::io::Error::other(err.to_string())))?;
        Ok(handles.contains(handle))
    }

    /// Returns the number of stored photos.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStoreError::Storage`] when the store lock is poisoned.
    pub fn stored_count(&self) -> PhotoStoreResult<usize> {
        let handles = self
            .handles
            .read()
            .map_err(|err| PhotoStoreError::storage(std::io::Error::other(err.to_string())))?;
        Ok(handles.len())
    }
}

#[async_trait]
impl PhotoStore for InMemoryPhotoStore {
    async fn store(&self, bytes: &[u8]) -> PhotoStoreResult<StoredPhoto> {
        let handle = PhotoHandle::new(format!("mem/{}.jpg", Uuid::new_v4()));
        let mut handles = self
            .handles
            .write()
            .map_err(|err| PhotoStoreError::storage(std::io::Error::other(err.to_string())))?;
        handles.insert(handle.clone());
        Ok(StoredPhoto {
            handle,
            size_bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            content_hash: hex_sha256(bytes),
        })
    }

    async fn delete(&self, handle: &PhotoHandle) -> PhotoStoreResult<()> {
        let mut handles = self
            .handles
            .write()
            .map_err(|err| PhotoStoreError::storage(std::io::Error::other(err.to_string())))?;
        handles.remove(handle);
        Ok(())
    }
}
