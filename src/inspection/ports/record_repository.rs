//! Repository port for inspection-record persistence and review.

use crate::inspection::domain::{
    CheckpointId, InspectionRecord, RecordId, ReviewDecision, ReviewStatus, TaskId, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for record repository operations.
pub type RecordRepositoryResult<T> = Result<T, RecordRepositoryError>;

/// Lightweight projection of a record for cooldown checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSummary {
    /// Record identifier.
    pub id: RecordId,
    /// Submitting inspector.
    pub inspector_id: UserId,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of an administrative review attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The decision was applied.
    Applied,
    /// Another administrator settled the record first; carries the status
    /// they applied.
    AlreadyReviewed(ReviewStatus),
}

/// Record persistence contract.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Persists a record, its items, and its photo rows while transitioning
    /// the closed task pending→completed, all as one atomic unit.
    ///
    /// The transition is guarded by a `status = pending` compare-and-set on
    /// the task row; of two concurrent submissions exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::TaskNotPending`] when the guard
    /// fails.
    async fn create_completing(&self, record: &InspectionRecord) -> RecordRepositoryResult<()>;

    /// Finds a record with its items and photos.
    ///
    /// Returns `None` when the record does not exist.
    async fn find_by_id(&self, id: RecordId) -> RecordRepositoryResult<Option<InspectionRecord>>;

    /// Returns the most recent record for a checkpoint submitted at or after
    /// `since`, for cooldown enforcement.
    async fn latest_for_checkpoint_since(
        &self,
        checkpoint_id: CheckpointId,
        since: DateTime<Utc>,
    ) -> RecordRepositoryResult<Option<RecordSummary>>;

    /// Applies a review decision, guarded by a `review_status = pending`
    /// compare-and-set so racing administrators produce exactly one
    /// effective decision.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::NotFound`] when the record does not
    /// exist.
    async fn review(
        &self,
        id: RecordId,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> RecordRepositoryResult<ReviewOutcome>;
}

/// Errors returned by record repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RecordRepositoryError {
    /// The task to complete was not pending at persist time.
    #[error("task {0} is not pending; submission lost the completion race or arrived late")]
    TaskNotPending(TaskId),

    /// The record was not found.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// A persisted row could not be mapped back into the domain.
    #[error("corrupt record row: {0}")]
    Corrupt(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RecordRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
