//! Shared in-memory store implementing the schedule, task, and record
//! repositories against one state, mirroring the single database the
//! production adapters share. Check-then-write sequences run under one
//! write lock, which gives the same atomicity the Diesel adapters get from
//! transactions.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::inspection::domain::{
    CheckpointId, InspectionRecord, RecordId, ReviewDecision, ReviewStatus, Schedule, ScheduleId,
    Task, TaskId, TaskStatus, UserId,
};
use crate::inspection::ports::{
    DeletionManifest, Page, PageRequest, RecordRepository, RecordRepositoryError,
    RecordRepositoryResult, RecordSummary, ReviewOutcome, ScheduleRepository,
    ScheduleRepositoryError, ScheduleRepositoryResult, TaskFilter, TaskRepository,
    TaskRepositoryError, TaskRepositoryResult, TaskStats,
};

#[derive(Debug, Default)]
struct StoreState {
    schedules: HashMap<ScheduleId, Schedule>,
    tasks: HashMap<TaskId, Task>,
    due_index: HashSet<(ScheduleId, DateTime<Utc>)>,
    records: HashMap<RecordId, InspectionRecord>,
}

/// Thread-safe in-memory store backing all three inspection repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInspectionStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryInspectionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, StoreState>, std::io::Error> {
        self.state
            .read()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, StoreState>, std::io::Error> {
        self.state
            .write()
            .map_err(|err| std::io::Error::other(err.to_string()))
    }
}

fn paginate(tasks: Vec<Task>, page: PageRequest) -> Page<Task> {
    let total = u64::try_from(tasks.len()).unwrap_or(u64::MAX);
    let items: Vec<Task> = tasks
        .into_iter()
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.per_page()).unwrap_or(usize::MAX))
        .collect();
    Page {
        items,
        total,
        page: page.page(),
        per_page: page.per_page(),
    }
}

fn matches_filter(task: &Task, filter: &TaskFilter, now: DateTime<Utc>) -> bool {
    if let Some(due_on) = filter.due_on
        && task.due_time().date_naive() != due_on
    {
        return false;
    }
    if let Some(checkpoint_id) = filter.checkpoint_id
        && task.checkpoint_id() != checkpoint_id
    {
        return false;
    }
    if let Some(effective) = filter.effective_status
        && task.effective_status(now) != effective
    {
        return false;
    }
    true
}

fn in_date_range(task: &Task, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let due_date = task.due_time().date_naive();
    if let Some(from_date) = from
        && due_date < from_date
    {
        return false;
    }
    if let Some(to_date) = to
        && due_date > to_date
    {
        return false;
    }
    true
}

/// Removes the given tasks and every dependent record, accumulating the
/// deletion manifest.
fn remove_tasks(state: &mut StoreState, task_ids: &[TaskId]) -> DeletionManifest {
    let mut manifest = DeletionManifest::default();
    let id_set: HashSet<TaskId> = task_ids.iter().copied().collect();

    let record_ids: Vec<RecordId> = state
        .records
        .values()
        .filter(|record| id_set.contains(&record.task_id()))
        .map(InspectionRecord::id)
        .collect();
    for record_id in record_ids {
        if let Some(record) = state.records.remove(&record_id) {
            manifest.records += 1;
            manifest.items += u64::try_from(record.items().len()).unwrap_or(u64::MAX);
            manifest.photos += u64::try_from(record.photos().len()).unwrap_or(u64::MAX);
            manifest
                .photo_handles
                .extend(record.photos().iter().map(|photo| photo.handle.clone()));
        }
    }

    for task_id in task_ids {
        if let Some(task) = state.tasks.remove(task_id) {
            state.due_index.remove(&(task.schedule_id(), task.due_time()));
            manifest.tasks += 1;
        }
    }
    manifest
}

#[async_trait]
impl ScheduleRepository for InMemoryInspectionStore {
    async fn insert(&self, schedule: &Schedule) -> ScheduleRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(ScheduleRepositoryError::persistence)?;
        if state.schedules.contains_key(&schedule.id()) {
            return Err(ScheduleRepositoryError::DuplicateSchedule(schedule.id()));
        }
        state.schedules.insert(schedule.id(), schedule.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>> {
        let state = self
            .read_state()
            .map_err(ScheduleRepositoryError::persistence)?;
        Ok(state.schedules.get(&id).cloned())
    }

    async fn list_active(&self) -> ScheduleRepositoryResult<Vec<Schedule>> {
        let state = self
            .read_state()
            .map_err(ScheduleRepositoryError::persistence)?;
        let mut schedules: Vec<Schedule> = state
            .schedules
            .values()
            .filter(|schedule| schedule.enabled())
            .cloned()
            .collect();
        schedules.sort_by_key(|schedule| (schedule.created_at(), schedule.id().into_inner()));
        Ok(schedules)
    }

    async fn set_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> ScheduleRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(ScheduleRepositoryError::persistence)?;
        let schedule = state
            .schedules
            .get_mut(&id)
            .ok_or(ScheduleRepositoryError::NotFound(id))?;
        schedule.set_enabled(enabled, now);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryInspectionStore {
    async fn insert_batch(&self, tasks: &[Task]) -> TaskRepositoryResult<usize> {
        let mut state = self
            .write_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut created = 0;
        for task in tasks {
            let key = (task.schedule_id(), task.due_time());
            if state.due_index.contains(&key) {
                continue;
            }
            state.due_index.insert(key);
            state.tasks.insert(task.id(), task.clone());
            created += 1;
        }
        Ok(created)
    }

    async fn existing_due_times(
        &self,
        schedule_id: ScheduleId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TaskRepositoryResult<HashSet<DateTime<Utc>>> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        Ok(state
            .due_index
            .iter()
            .filter(|(sid, due)| *sid == schedule_id && *due >= from && *due < to)
            .map(|(_, due)| *due)
            .collect())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list_available(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.is_available(now))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.due_time(), task.id().into_inner()));
        Ok(paginate(tasks, page))
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filter(task, filter, now))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (std::cmp::Reverse(task.due_time()), task.id().into_inner()));
        Ok(paginate(tasks, page))
    }

    async fn list_unpaged(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| matches_filter(task, filter, now))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.due_time(), task.id().into_inner()));
        Ok(tasks)
    }

    async fn mark_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64> {
        let mut state = self
            .write_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut transitioned = 0;
        for task in state.tasks.values_mut() {
            if task.is_effectively_overdue(now) {
                task.mark_overdue();
                transitioned += 1;
            }
        }
        Ok(transitioned)
    }

    async fn status_counts(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStats> {
        let state = self
            .read_state()
            .map_err(TaskRepositoryError::persistence)?;
        let mut stats = TaskStats::default();
        for task in state
            .tasks
            .values()
            .filter(|task| in_date_range(task, from, to))
        {
            stats.total += 1;
            match task.effective_status(now) {
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Overdue => stats.overdue += 1,
            }
        }
        Ok(stats)
    }

    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<DeletionManifest> {
        let mut state = self
            .write_state()
            .map_err(TaskRepositoryError::persistence)?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        Ok(remove_tasks(&mut state, &[id]))
    }

    async fn delete_all(&self) -> TaskRepositoryResult<DeletionManifest> {
        let mut state = self
            .write_state()
            .map_err(TaskRepositoryError::persistence)?;
        let ids: Vec<TaskId> = state.tasks.keys().copied().collect();
        Ok(remove_tasks(&mut state, &ids))
    }

    async fn delete_completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<DeletionManifest> {
        let mut state = self
            .write_state()
            .map_err(TaskRepositoryError::persistence)?;
        let ids: Vec<TaskId> = state
            .tasks
            .values()
            .filter(|task| {
                task.status() == TaskStatus::Completed
                    && task.completed_at().is_some_and(|at| at <= cutoff)
            })
            .map(Task::id)
            .collect();
        Ok(remove_tasks(&mut state, &ids))
    }
}

#[async_trait]
impl RecordRepository for InMemoryInspectionStore {
    async fn create_completing(&self, record: &InspectionRecord) -> RecordRepositoryResult<()> {
        let mut state = self
            .write_state()
            .map_err(RecordRepositoryError::persistence)?;
        let task = state
            .tasks
            .get_mut(&record.task_id())
            .filter(|task| task.status() == TaskStatus::Pending)
            .ok_or(RecordRepositoryError::TaskNotPending(record.task_id()))?;
        task.mark_completed(record.submitted_at());
        state.records.insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RecordId) -> RecordRepositoryResult<Option<InspectionRecord>> {
        let state = self
            .read_state()
            .map_err(RecordRepositoryError::persistence)?;
        Ok(state.records.get(&id).cloned())
    }

    async fn latest_for_checkpoint_since(
        &self,
        checkpoint_id: CheckpointId,
        since: DateTime<Utc>,
    ) -> RecordRepositoryResult<Option<RecordSummary>> {
        let state = self
            .read_state()
            .map_err(RecordRepositoryError::persistence)?;
        Ok(state
            .records
            .values()
            .filter(|record| {
                record.checkpoint_id() == checkpoint_id && record.submitted_at() >= since
            })
            .max_by_key(|record| record.submitted_at())
            .map(|record| RecordSummary {
                id: record.id(),
                inspector_id: record.inspector_id(),
                submitted_at: record.submitted_at(),
            }))
    }

    async fn review(
        &self,
        id: RecordId,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> RecordRepositoryResult<ReviewOutcome> {
        let mut state = self
            .write_state()
            .map_err(RecordRepositoryError::persistence)?;
        let record = state
            .records
            .get_mut(&id)
            .ok_or(RecordRepositoryError::NotFound(id))?;
        if record.review_status() != ReviewStatus::Pending {
            return Ok(ReviewOutcome::AlreadyReviewed(record.review_status()));
        }
        record.apply_review(decision, reviewer, comment, now);
        Ok(ReviewOutcome::Applied)
    }
}
