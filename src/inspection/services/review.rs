//! Administrative review of inspection records.

use crate::inspection::{
    domain::{RecordId, ReviewDecision, UserId},
    ports::{RecordRepository, RecordRepositoryError, ReviewOutcome},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for record review.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Record persistence failed.
    #[error(transparent)]
    Repository(#[from] RecordRepositoryError),
}

/// Result type for review operations.
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Applies approve/punish decisions to pending records.
#[derive(Clone)]
pub struct ReviewService<R, C>
where
    R: RecordRepository,
    C: Clock + Send + Sync,
{
    records: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> ReviewService<R, C>
where
    R: RecordRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new review service.
    #[must_use]
    pub const fn new(records: Arc<R>, clock: Arc<C>) -> Self {
        Self { records, clock }
    }

    /// Applies a decision to a pending record.
    ///
    /// The storage-level compare-and-set on the pending review state means
    /// exactly one of two racing administrators gets
    /// [`ReviewOutcome::Applied`]; the other sees the settled status.
    ///
    /// # Errors
    ///
    /// Returns [`RecordRepositoryError::NotFound`] wrapped in
    /// [`ReviewError::Repository`] when the record does not exist.
    pub async fn review(
        &self,
        record_id: RecordId,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
    ) -> ReviewResult<ReviewOutcome> {
        let now = self.clock.utc();
        Ok(self
            .records
            .review(record_id, decision, reviewer, comment, now)
            .await?)
    }
}
