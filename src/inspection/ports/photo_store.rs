//! Port for the external photo file store.
//!
//! Photo processing internals (normalization, encoding) live behind this
//! boundary; the engine only consumes "store bytes, get handle + hash".

use crate::inspection::domain::PhotoHandle;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for photo store operations.
pub type PhotoStoreResult<T> = Result<T, PhotoStoreError>;

/// Outcome of storing one photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// Storage-assigned handle for later retrieval or deletion.
    pub handle: PhotoHandle,
    /// Stored size in bytes.
    pub size_bytes: u64,
    /// Hex sha256 of the raw content, used for duplicate detection.
    pub content_hash: String,
}

/// Photo file storage contract.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Stores raw photo bytes and returns the handle, size, and content
    /// hash.
    async fn store(&self, bytes: &[u8]) -> PhotoStoreResult<StoredPhoto>;

    /// Deletes a stored photo. Deleting a handle that no longer exists is
    /// not an error.
    async fn delete(&self, handle: &PhotoHandle) -> PhotoStoreResult<()>;
}

/// Errors returned by photo store implementations.
#[derive(Debug, Clone, Error)]
pub enum PhotoStoreError {
    /// Underlying storage failure.
    #[error("photo storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl PhotoStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
