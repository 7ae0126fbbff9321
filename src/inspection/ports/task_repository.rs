//! Repository port for task persistence, queries, and cascading deletion.

use crate::inspection::domain::{CheckpointId, PhotoHandle, ScheduleId, Task, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// One-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Creates a pagination request, clamping `page` to at least 1 and
    /// `per_page` to 1..=500.
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 500),
        }
    }

    /// Returns the one-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Returns the number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64).saturating_sub(1) * self.per_page as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 50)
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: u64,
    /// One-based page number served.
    pub page: u32,
    /// Page size requested.
    pub per_page: u32,
}

/// Admin listing filter. All criteria are conjunctive; `None` means
/// unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Restrict to tasks due on this calendar day.
    pub due_on: Option<NaiveDate>,
    /// Restrict by *effective* status (evaluated against the query instant).
    pub effective_status: Option<TaskStatus>,
    /// Restrict to one checkpoint.
    pub checkpoint_id: Option<CheckpointId>,
}

/// Status rollup over a set of tasks, using effective-status arithmetic:
/// `completed + pending + overdue == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// All matching tasks.
    pub total: u64,
    /// Completed tasks.
    pub completed: u64,
    /// Pending tasks whose window is still open.
    pub pending: u64,
    /// Stored-overdue tasks plus pending tasks past their window.
    pub overdue: u64,
}

/// Outcome of an explicit cascading deletion: row counts per table plus the
/// photo file handles the caller should best-effort remove from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionManifest {
    /// Deleted task rows.
    pub tasks: u64,
    /// Deleted record rows.
    pub records: u64,
    /// Deleted answer-item rows.
    pub items: u64,
    /// Deleted photo rows.
    pub photos: u64,
    /// File handles of the deleted photo rows.
    pub photo_handles: Vec<PhotoHandle>,
}

impl DeletionManifest {
    /// Returns whether the deletion touched nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks == 0 && self.records == 0
    }
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a batch of generated tasks as one atomic unit, skipping any
    /// row whose `(schedule_id, due_time)` pair already exists.
    ///
    /// Returns the number of tasks actually created.
    async fn insert_batch(&self, tasks: &[Task]) -> TaskRepositoryResult<usize>;

    /// Returns the due instants already generated for a schedule within
    /// `[from, to)`, for generation dedup.
    async fn existing_due_times(
        &self,
        schedule_id: ScheduleId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TaskRepositoryResult<HashSet<DateTime<Utc>>>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the staff work queue: tasks whose due time has arrived, whose
    /// window has not closed, and whose stored status is pending, ordered by
    /// due time ascending.
    async fn list_available(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>>;

    /// Admin listing with effective-status filtering, ordered by due time
    /// descending.
    async fn list(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>>;

    /// Unpaged variant of [`TaskRepository::list`] for read-side rollups,
    /// ordered by due time ascending.
    async fn list_unpaged(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Bulk-transitions pending tasks past their window to overdue.
    ///
    /// Idempotent: once overdue, a row no longer matches the pending filter.
    /// Returns the number of rows transitioned.
    async fn mark_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64>;

    /// Status rollup over tasks due within `[from, to]` (whole days, both
    /// optional).
    async fn status_counts(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStats>;

    /// Deletes one task and its dependent records, items, and photo rows in
    /// one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist.
    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<DeletionManifest>;

    /// Deletes every task and all dependent rows in one transaction.
    async fn delete_all(&self) -> TaskRepositoryResult<DeletionManifest>;

    /// Deletes completed tasks whose completion instant is at or before
    /// `cutoff`, with dependents, in one transaction.
    async fn delete_completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<DeletionManifest>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A persisted row could not be mapped back into the domain.
    #[error("corrupt task row: {0}")]
    Corrupt(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
