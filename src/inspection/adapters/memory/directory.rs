//! Static checkpoint directory for tests.

use async_trait::async_trait;

use crate::inspection::ports::{
    CheckpointDirectory, CheckpointDirectoryResult, CheckpointInfo,
};

/// Checkpoint directory serving a fixed catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticCheckpointDirectory {
    checkpoints: Vec<CheckpointInfo>,
}

impl StaticCheckpointDirectory {
    /// Creates a directory serving the given checkpoints.
    #[must_use]
    pub const fn new(checkpoints: Vec<CheckpointInfo>) -> Self {
        Self { checkpoints }
    }
}

#[async_trait]
impl CheckpointDirectory for StaticCheckpointDirectory {
    async fn list_enabled(&self) -> CheckpointDirectoryResult<Vec<CheckpointInfo>> {
        Ok(self.checkpoints.clone())
    }
}
