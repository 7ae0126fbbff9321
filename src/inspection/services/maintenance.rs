//! Explicit cascading deletion of tasks with their records and photo files.

use crate::inspection::{
    domain::TaskId,
    ports::{DeletionManifest, PhotoStore, TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Service-level errors for task maintenance.
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// Task persistence failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
}

/// Result type for maintenance operations.
pub type MaintenanceResult<T> = Result<T, MaintenanceError>;

/// Deletes tasks together with their dependent records, items, and photos.
///
/// Database rows go in one transaction; photo files are removed from storage
/// afterwards on a best-effort basis, so a file-store failure never leaves
/// the database half-deleted.
#[derive(Clone)]
pub struct TaskMaintenanceService<T, P>
where
    T: TaskRepository,
    P: PhotoStore,
{
    tasks: Arc<T>,
    photos: Arc<P>,
}

impl<T, P> TaskMaintenanceService<T, P>
where
    T: TaskRepository,
    P: PhotoStore,
{
    /// Creates a new maintenance service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, photos: Arc<P>) -> Self {
        Self { tasks, photos }
    }

    /// Deletes one task and everything hanging off it.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] wrapped in
    /// [`MaintenanceError::Repository`] when the task does not exist.
    pub async fn delete_task(&self, id: TaskId) -> MaintenanceResult<DeletionManifest> {
        let manifest = self.tasks.delete_task(id).await?;
        self.remove_photo_files(&manifest).await;
        Ok(manifest)
    }

    /// Deletes every task and all dependent rows.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::Repository`] when the transaction fails.
    pub async fn delete_all(&self) -> MaintenanceResult<DeletionManifest> {
        let manifest = self.tasks.delete_all().await?;
        self.remove_photo_files(&manifest).await;
        Ok(manifest)
    }

    /// Deletes completed tasks whose completion instant is at or before
    /// `cutoff`, with dependents.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::Repository`] when the transaction fails.
    pub async fn delete_completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> MaintenanceResult<DeletionManifest> {
        let manifest = self.tasks.delete_completed_before(cutoff).await?;
        if !manifest.is_empty() {
            info!(
                tasks = manifest.tasks,
                records = manifest.records,
                photos = manifest.photos,
                "removed expired completed tasks"
            );
        }
        self.remove_photo_files(&manifest).await;
        Ok(manifest)
    }

    async fn remove_photo_files(&self, manifest: &DeletionManifest) {
        for handle in &manifest.photo_handles {
            if let Err(err) = self.photos.delete(handle).await {
                warn!(%handle, error = %err, "failed to delete photo file");
            }
        }
    }
}
