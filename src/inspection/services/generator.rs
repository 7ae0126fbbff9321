//! Service layer for turning recurrence schedules into concrete tasks.

use crate::inspection::{
    domain::Task,
    ports::{
        ScheduleRepository, ScheduleRepositoryError, TaskRepository, TaskRepositoryError,
    },
};
use chrono::{Duration, NaiveDate, NaiveTime};
use mockable::Clock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::debug;

/// Service-level errors for task generation.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Another generation run is still in flight in this process.
    #[error("a generation run is already in progress")]
    InProgress,

    /// The requested range ends before it starts.
    #[error("generation range ends ({end}) before it starts ({start})")]
    InvalidRange {
        /// Requested range start.
        start: NaiveDate,
        /// Requested range end.
        end: NaiveDate,
    },

    /// Schedule lookup failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleRepositoryError),

    /// Task persistence failed.
    #[error(transparent)]
    Task(#[from] TaskRepositoryError),
}

/// Result type for generation service operations.
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Expands enabled schedules into pending tasks over a date range.
///
/// Clones share the in-flight guard, so the overlap check spans every
/// handle in the process.
pub struct TaskGenerator<S, T, C>
where
    S: ScheduleRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    schedules: Arc<S>,
    tasks: Arc<T>,
    clock: Arc<C>,
    horizon_days: u32,
    in_progress: Arc<AtomicBool>,
}

impl<S, T, C> Clone for TaskGenerator<S, T, C>
where
    S: ScheduleRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            schedules: Arc::clone(&self.schedules),
            tasks: Arc::clone(&self.tasks),
            clock: Arc::clone(&self.clock),
            horizon_days: self.horizon_days,
            in_progress: Arc::clone(&self.in_progress),
        }
    }
}

/// Clears the in-flight flag when a run finishes, on every exit path.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<S, T, C> TaskGenerator<S, T, C>
where
    S: ScheduleRepository,
    T: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new generator covering `horizon_days` beyond the start date
    /// by default.
    #[must_use]
    pub fn new(schedules: Arc<S>, tasks: Arc<T>, clock: Arc<C>, horizon_days: u32) -> Self {
        Self {
            schedules,
            tasks,
            clock,
            horizon_days,
            in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Generates tasks for every enabled schedule across `[start, end]`,
    /// both inclusive, defaulting to today through today plus the horizon.
    ///
    /// Candidates whose `(schedule, due_time)` pair already exists are
    /// skipped, so overlapping invocations are idempotent; the storage-level
    /// unique index covers the race between the read-side check and the
    /// insert. Returns the number of tasks actually created, which is zero
    /// when every candidate already existed.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InProgress`] when invoked while a previous
    /// run in this process has not finished. The guard only avoids wasted
    /// work; correctness never depends on it.
    pub async fn generate(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> GenerationResult<usize> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GenerationError::InProgress);
        }
        let _guard = RunGuard(&self.in_progress);

        let first = start.unwrap_or_else(|| self.clock.utc().date_naive());
        let last = end.unwrap_or_else(|| first + Duration::days(i64::from(self.horizon_days)));
        if last < first {
            return Err(GenerationError::InvalidRange {
                start: first,
                end: last,
            });
        }

        let range_from = first.and_time(NaiveTime::MIN).and_utc();
        let range_to = (last + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

        let mut batch = Vec::new();
        for schedule in self.schedules.list_active().await? {
            let existing = self
                .tasks
                .existing_due_times(schedule.id(), range_from, range_to)
                .await?;

            let mut date = first;
            while date <= last {
                for due_time in schedule.due_times_on(date) {
                    if !existing.contains(&due_time) {
                        batch.push(Task::generated(&schedule, due_time, &*self.clock));
                    }
                }
                date += Duration::days(1);
            }
        }

        let created = self.tasks.insert_batch(&batch).await?;
        debug!(created, start = %first, end = %last, "task generation finished");
        Ok(created)
    }
}
