//! Repository port for recurrence-schedule persistence.

use crate::inspection::domain::{Schedule, ScheduleId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for schedule repository operations.
pub type ScheduleRepositoryResult<T> = Result<T, ScheduleRepositoryError>;

/// Schedule persistence contract.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Stores a new schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::DuplicateSchedule`] when the
    /// identifier already exists.
    async fn insert(&self, schedule: &Schedule) -> ScheduleRepositoryResult<()>;

    /// Finds a schedule by identifier.
    ///
    /// Returns `None` when the schedule does not exist.
    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>>;

    /// Returns all enabled schedules.
    async fn list_active(&self) -> ScheduleRepositoryResult<Vec<Schedule>>;

    /// Enables or disables a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleRepositoryError::NotFound`] when the schedule does
    /// not exist.
    async fn set_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> ScheduleRepositoryResult<()>;
}

/// Errors returned by schedule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ScheduleRepositoryError {
    /// A schedule with the same identifier already exists.
    #[error("duplicate schedule identifier: {0}")]
    DuplicateSchedule(ScheduleId),

    /// The schedule was not found.
    #[error("schedule not found: {0}")]
    NotFound(ScheduleId),

    /// A persisted row could not be mapped back into the domain.
    #[error("corrupt schedule row: {0}")]
    Corrupt(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ScheduleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
