//! Port for the external checkpoint/area catalog.
//!
//! Checkpoint and area CRUD is another system's concern; the engine only
//! needs names and the area hierarchy to label grouped task views.

use crate::inspection::domain::{AreaId, CheckpointId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for checkpoint directory operations.
pub type CheckpointDirectoryResult<T> = Result<T, CheckpointDirectoryError>;

/// Facility area a checkpoint belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaInfo {
    /// Area identifier.
    pub id: AreaId,
    /// Display name.
    pub name: String,
    /// Floor label, when assigned.
    pub floor: Option<String>,
    /// Building label, when assigned.
    pub building: Option<String>,
}

/// One enabled checkpoint from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointInfo {
    /// Checkpoint identifier.
    pub id: CheckpointId,
    /// Display name.
    pub name: String,
    /// Containing area, when assigned.
    pub area: Option<AreaInfo>,
}

/// Checkpoint catalog contract.
#[async_trait]
pub trait CheckpointDirectory: Send + Sync {
    /// Returns all enabled checkpoints with their area assignments.
    async fn list_enabled(&self) -> CheckpointDirectoryResult<Vec<CheckpointInfo>>;
}

/// Errors returned by checkpoint directory implementations.
#[derive(Debug, Clone, Error)]
pub enum CheckpointDirectoryError {
    /// The catalog could not be reached.
    #[error("checkpoint directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl CheckpointDirectoryError {
    /// Wraps a catalog access error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
