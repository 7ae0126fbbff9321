//! Filesystem photo store over a capability-scoped directory.
//!
//! Files are laid out as `YYYYMMDD/<uuid>.jpg` under the store root, the
//! layout the photo-serving layer expects. The handle persisted on record
//! rows is that relative path.

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::Clock;
use std::sync::Arc;
use uuid::Uuid;

use super::hex_sha256;
use crate::inspection::domain::PhotoHandle;
use crate::inspection::ports::{PhotoStore, PhotoStoreError, PhotoStoreResult, StoredPhoto};

/// Photo store writing files beneath one capability-scoped root directory.
pub struct DirectoryPhotoStore<C> {
    root: Dir,
    clock: Arc<C>,
}

impl<C> DirectoryPhotoStore<C>
where
    C: Clock + Send + Sync,
{
    /// Opens the store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PhotoStoreError::Storage`] when the root cannot be opened.
    pub fn open(path: &str, clock: Arc<C>) -> PhotoStoreResult<Self> {
        std::fs::create_dir_all(path).map_err(PhotoStoreError::storage)?;
        let root =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(PhotoStoreError::storage)?;
        Ok(Self { root, clock })
    }
}

#[async_trait]
impl<C> PhotoStore for DirectoryPhotoStore<C>
where
    C: Clock + Send + Sync,
{
    async fn store(&self, bytes: &[u8]) -> PhotoStoreResult<StoredPhoto> {
        let date_dir = self.clock.utc().format("%Y%m%d").to_string();
        self.root
            .create_dir_all(&date_dir)
            .map_err(PhotoStoreError::storage)?;
        let relative_path = format!("{date_dir}/{}.jpg", Uuid::new_v4());
        self.root
            .write(&relative_path, bytes)
            .map_err(PhotoStoreError::storage)?;
        Ok(StoredPhoto {
            handle: PhotoHandle::new(relative_path),
            size_bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            content_hash: hex_sha256(bytes),
        })
    }

    async fn delete(&self, handle: &PhotoHandle) -> PhotoStoreResult<()> {
        match self.root.remove_file(handle.as_str()) {
            Ok(()) => Ok(()),
            // Already gone: deletion is best-effort and idempotent.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PhotoStoreError::storage(err)),
        }
    }
}
