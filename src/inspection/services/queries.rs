//! Read-side task queries: listings, projections, and grouped rollups.

use crate::inspection::{
    domain::{CheckpointId, ScheduleId, Task, TaskId, TaskStatus},
    ports::{
        AreaInfo, CheckpointDirectory, CheckpointDirectoryError, Page, PageRequest, TaskFilter,
        TaskRepository, TaskRepositoryError, TaskStats,
    },
};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for task queries.
#[derive(Debug, Error)]
pub enum TaskQueryError {
    /// Task persistence lookup failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// The checkpoint catalog could not be reached.
    #[error(transparent)]
    Directory(#[from] CheckpointDirectoryError),
}

/// Result type for task query operations.
pub type TaskQueryResult<T> = Result<T, TaskQueryError>;

/// Read projection of a task carrying the effective status: a pending task
/// past its window reads as overdue even before the sweep runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskView {
    /// Task identifier.
    pub id: TaskId,
    /// Originating schedule.
    pub schedule_id: ScheduleId,
    /// Checkpoint the task inspects.
    pub checkpoint_id: CheckpointId,
    /// Nominal due instant.
    pub due_time: DateTime<Utc>,
    /// Earliest accepted submission instant.
    pub window_start: DateTime<Utc>,
    /// Latest accepted submission instant.
    pub window_end: DateTime<Utc>,
    /// Effective status at query time.
    pub status: TaskStatus,
    /// Completion instant, when completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskView {
    fn project(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id(),
            schedule_id: task.schedule_id(),
            checkpoint_id: task.checkpoint_id(),
            due_time: task.due_time(),
            window_start: task.window_start(),
            window_end: task.window_end(),
            status: task.effective_status(now),
            completed_at: task.completed_at(),
        }
    }
}

/// Per-checkpoint task rollup within a grouped view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointRollup {
    /// Checkpoint identifier.
    pub checkpoint_id: CheckpointId,
    /// Checkpoint display name from the catalog.
    pub checkpoint_name: String,
    /// Effective-status counts for the checkpoint's tasks.
    pub stats: TaskStats,
}

/// Per-area grouping of checkpoint rollups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRollup {
    /// Containing area, or `None` for checkpoints without an assignment.
    pub area: Option<AreaInfo>,
    /// Checkpoints in this area, ordered by name.
    pub checkpoints: Vec<CheckpointRollup>,
}

/// Read-side query service over tasks and the checkpoint catalog.
#[derive(Clone)]
pub struct TaskQueryService<T, D, C>
where
    T: TaskRepository,
    D: CheckpointDirectory,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<T, D, C> TaskQueryService<T, D, C>
where
    T: TaskRepository,
    D: CheckpointDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a new query service.
    #[must_use]
    pub const fn new(tasks: Arc<T>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            directory,
            clock,
        }
    }

    /// Returns the staff work queue: due, window still open, stored
    /// pending, ordered by due time ascending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::Repository`] when the listing fails.
    pub async fn list_available(&self, page: PageRequest) -> TaskQueryResult<Page<TaskView>> {
        let now = self.clock.utc();
        let tasks = self.tasks.list_available(now, page).await?;
        Ok(Page {
            items: tasks
                .items
                .iter()
                .map(|task| TaskView::project(task, now))
                .collect(),
            total: tasks.total,
            page: tasks.page,
            per_page: tasks.per_page,
        })
    }

    /// Admin listing with date, effective-status, and checkpoint filters,
    /// ordered by due time descending.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::Repository`] when the listing fails.
    pub async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskQueryResult<Page<TaskView>> {
        let now = self.clock.utc();
        let tasks = self.tasks.list(filter, now, page).await?;
        Ok(Page {
            items: tasks
                .items
                .iter()
                .map(|task| TaskView::project(task, now))
                .collect(),
            total: tasks.total,
            page: tasks.page,
            per_page: tasks.per_page,
        })
    }

    /// Returns one task with its effective status, or `None` when it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::Repository`] when the lookup fails.
    pub async fn get_task(&self, id: TaskId) -> TaskQueryResult<Option<TaskView>> {
        let now = self.clock.utc();
        let found = self.tasks.find_by_id(id).await?;
        Ok(found.map(|task| TaskView::project(&task, now)))
    }

    /// Groups tasks due on a day by area and checkpoint, resolving names
    /// through the catalog. Enabled checkpoints without tasks appear with
    /// zero counts; the grouping is computed here rather than in storage.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::Directory`] when the catalog is
    /// unreachable or [`TaskQueryError::Repository`] when the listing
    /// fails.
    pub async fn grouped(&self, due_on: Option<NaiveDate>) -> TaskQueryResult<Vec<AreaRollup>> {
        let now = self.clock.utc();
        let checkpoints = self.directory.list_enabled().await?;
        let filter = TaskFilter {
            due_on,
            effective_status: None,
            checkpoint_id: None,
        };
        let tasks = self.tasks.list_unpaged(&filter, now).await?;

        let mut per_checkpoint: HashMap<CheckpointId, TaskStats> = HashMap::new();
        for task in &tasks {
            let stats = per_checkpoint.entry(task.checkpoint_id()).or_default();
            stats.total += 1;
            match task.effective_status(now) {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Overdue => stats.overdue += 1,
            }
        }

        let mut areas: Vec<AreaRollup> = Vec::new();
        for checkpoint in checkpoints {
            let rollup = CheckpointRollup {
                checkpoint_id: checkpoint.id,
                checkpoint_name: checkpoint.name,
                stats: per_checkpoint
                    .get(&checkpoint.id)
                    .copied()
                    .unwrap_or_default(),
            };
            let slot = areas.iter_mut().find(|group| {
                match (&group.area, &checkpoint.area) {
                    (Some(existing), Some(area)) => existing.id == area.id,
                    (None, None) => true,
                    _ => false,
                }
            });
            match slot {
                Some(group) => group.checkpoints.push(rollup),
                None => areas.push(AreaRollup {
                    area: checkpoint.area,
                    checkpoints: vec![rollup],
                }),
            }
        }

        for group in &mut areas {
            group
                .checkpoints
                .sort_by(|a, b| a.checkpoint_name.cmp(&b.checkpoint_name));
        }
        areas.sort_by(|a, b| {
            let name_a = a.area.as_ref().map(|area| area.name.as_str());
            let name_b = b.area.as_ref().map(|area| area.name.as_str());
            name_a.cmp(&name_b)
        });
        Ok(areas)
    }

    /// Effective-status rollup over tasks due within the given whole-day
    /// range, both bounds optional and inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`TaskQueryError::Repository`] when counting fails.
    pub async fn stats(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> TaskQueryResult<TaskStats> {
        let now = self.clock.utc();
        Ok(self.tasks.status_counts(from, to, now).await?)
    }
}
