//! `PostgreSQL` repository implementation for task storage and queries.

use super::{
    InspectionPgPool,
    models::{NewTaskRow, TaskRow},
    schema::{inspection_records, inspection_tasks, record_items, record_photos},
};
use crate::inspection::{
    domain::{
        CheckpointId, PersistedTaskData, PhotoHandle, ScheduleId, Task, TaskId, TaskStatus,
    },
    ports::{
        DeletionManifest, Page, PageRequest, TaskFilter, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult, TaskStats,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use std::collections::HashSet;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: InspectionPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: InspectionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert_batch(&self, tasks: &[Task]) -> TaskRepositoryResult<usize> {
        if tasks.is_empty() {
            return Ok(0);
        }
        let new_rows: Vec<NewTaskRow> = tasks.iter().map(to_new_row).collect();

        self.run_blocking(move |connection| {
            // The unique index on (schedule_id, due_time) makes generation
            // idempotent even when two generators race past the read-side
            // dedup.
            diesel::insert_into(inspection_tasks::table)
                .values(&new_rows)
                .on_conflict((inspection_tasks::schedule_id, inspection_tasks::due_time))
                .do_nothing()
                .execute(connection)
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn existing_due_times(
        &self,
        schedule_id: ScheduleId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> TaskRepositoryResult<HashSet<DateTime<Utc>>> {
        self.run_blocking(move |connection| {
            let due_times = inspection_tasks::table
                .filter(inspection_tasks::schedule_id.eq(schedule_id.into_inner()))
                .filter(inspection_tasks::due_time.ge(from))
                .filter(inspection_tasks::due_time.lt(to))
                .select(inspection_tasks::due_time)
                .load::<DateTime<Utc>>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(due_times.into_iter().collect())
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = inspection_tasks::table
                .filter(inspection_tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_available(
        &self,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>> {
        self.run_blocking(move |connection| {
            let available = || {
                inspection_tasks::table
                    .filter(inspection_tasks::status.eq(TaskStatus::Pending.as_str()))
                    .filter(inspection_tasks::due_time.le(now))
                    .filter(inspection_tasks::window_end.ge(now))
            };

            let total = available()
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = available()
                .order(inspection_tasks::due_time.asc())
                .offset(page_offset(page))
                .limit(i64::from(page.per_page()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            to_page(rows, total, page)
        })
        .await
    }

    async fn list(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
        page: PageRequest,
    ) -> TaskRepositoryResult<Page<Task>> {
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let total = filtered(criteria, now)
                .count()
                .get_result::<i64>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            let rows = filtered(criteria, now)
                .order(inspection_tasks::due_time.desc())
                .offset(page_offset(page))
                .limit(i64::from(page.per_page()))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;

            to_page(rows, total, page)
        })
        .await
    }

    async fn list_unpaged(
        &self,
        filter: &TaskFilter,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let criteria = *filter;
        self.run_blocking(move |connection| {
            let rows = filtered(criteria, now)
                .order(inspection_tasks::due_time.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn mark_overdue(&self, now: DateTime<Utc>) -> TaskRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                inspection_tasks::table
                    .filter(inspection_tasks::status.eq(TaskStatus::Pending.as_str()))
                    .filter(inspection_tasks::window_end.lt(now)),
            )
            .set(inspection_tasks::status.eq(TaskStatus::Overdue.as_str()))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(u64::try_from(updated).unwrap_or(u64::MAX))
        })
        .await
    }

    async fn status_counts(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStats> {
        self.run_blocking(move |connection| {
            let mut count_with = |status: Option<TaskStatus>| -> TaskRepositoryResult<u64> {
                let criteria = TaskFilter {
                    due_on: None,
                    effective_status: status,
                    checkpoint_id: None,
                };
                let mut query = filtered(criteria, now);
                if let Some(first_day) = from {
                    query = query.filter(inspection_tasks::due_time.ge(day_start(first_day)));
                }
                if let Some(last_day) = to {
                    query = query.filter(
                        inspection_tasks::due_time.lt(day_start(last_day) + Duration::days(1)),
                    );
                }
                let total = query
                    .count()
                    .get_result::<i64>(connection)
                    .map_err(TaskRepositoryError::persistence)?;
                Ok(u64::try_from(total).unwrap_or_default())
            };

            Ok(TaskStats {
                total: count_with(None)?,
                completed: count_with(Some(TaskStatus::Completed))?,
                pending: count_with(Some(TaskStatus::Pending))?,
                overdue: count_with(Some(TaskStatus::Overdue))?,
            })
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> TaskRepositoryResult<DeletionManifest> {
        self.run_blocking(move |connection| {
            let manifest = connection
                .transaction::<DeletionManifest, DieselError, _>(|connection| {
                    delete_cascade(connection, &[id.into_inner()])
                })
                .map_err(TaskRepositoryError::persistence)?;
            if manifest.is_empty() {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(manifest)
        })
        .await
    }

    async fn delete_all(&self) -> TaskRepositoryResult<DeletionManifest> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<DeletionManifest, DieselError, _>(|connection| {
                    let ids = inspection_tasks::table
                        .select(inspection_tasks::id)
                        .load::<uuid::Uuid>(connection)?;
                    delete_cascade(connection, &ids)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }

    async fn delete_completed_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> TaskRepositoryResult<DeletionManifest> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<DeletionManifest, DieselError, _>(|connection| {
                    let ids = inspection_tasks::table
                        .filter(inspection_tasks::status.eq(TaskStatus::Completed.as_str()))
                        .filter(inspection_tasks::completed_at.le(cutoff))
                        .select(inspection_tasks::id)
                        .load::<uuid::Uuid>(connection)?;
                    delete_cascade(connection, &ids)
                })
                .map_err(TaskRepositoryError::persistence)
        })
        .await
    }
}

type BoxedTaskQuery<'a> = inspection_tasks::BoxedQuery<'a, Pg>;

/// Builds the admin listing query, translating an effective-status filter
/// into storage terms: a pending row past its window matches `Overdue`, not
/// `Pending`.
fn filtered<'a>(filter: TaskFilter, now: DateTime<Utc>) -> BoxedTaskQuery<'a> {
    let mut query = inspection_tasks::table.into_boxed();

    if let Some(due_on) = filter.due_on {
        let start = day_start(due_on);
        query = query
            .filter(inspection_tasks::due_time.ge(start))
            .filter(inspection_tasks::due_time.lt(start + Duration::days(1)));
    }
    if let Some(checkpoint_id) = filter.checkpoint_id {
        query = query.filter(inspection_tasks::checkpoint_id.eq(checkpoint_id.into_inner()));
    }
    match filter.effective_status {
        Some(TaskStatus::Pending) => {
            query = query
                .filter(inspection_tasks::status.eq(TaskStatus::Pending.as_str()))
                .filter(inspection_tasks::window_end.ge(now));
        }
        Some(TaskStatus::Completed) => {
            query = query.filter(inspection_tasks::status.eq(TaskStatus::Completed.as_str()));
        }
        Some(TaskStatus::Overdue) => {
            query = query.filter(
                inspection_tasks::status.eq(TaskStatus::Overdue.as_str()).or(
                    inspection_tasks::status
                        .eq(TaskStatus::Pending.as_str())
                        .and(inspection_tasks::window_end.lt(now)),
                ),
            );
        }
        None => {}
    }

    query
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn page_offset(page: PageRequest) -> i64 {
    i64::try_from(page.offset()).unwrap_or(i64::MAX)
}

fn to_page(rows: Vec<TaskRow>, total: i64, page: PageRequest) -> TaskRepositoryResult<Page<Task>> {
    let items = rows
        .into_iter()
        .map(row_to_task)
        .collect::<TaskRepositoryResult<Vec<_>>>()?;
    Ok(Page {
        items,
        total: u64::try_from(total).unwrap_or_default(),
        page: page.page(),
        per_page: page.per_page(),
    })
}

/// Deletes the given tasks and every dependent row, collecting counts and
/// photo file paths for the caller's storage cleanup.
fn delete_cascade(
    connection: &mut PgConnection,
    task_ids: &[uuid::Uuid],
) -> Result<DeletionManifest, DieselError> {
    if task_ids.is_empty() {
        return Ok(DeletionManifest::default());
    }

    let record_ids = inspection_records::table
        .filter(inspection_records::task_id.eq_any(task_ids))
        .select(inspection_records::id)
        .load::<uuid::Uuid>(connection)?;
    let photo_paths = record_photos::table
        .filter(record_photos::record_id.eq_any(&record_ids))
        .select(record_photos::file_path)
        .load::<String>(connection)?;

    let photos = diesel::delete(
        record_photos::table.filter(record_photos::record_id.eq_any(&record_ids)),
    )
    .execute(connection)?;
    let items = diesel::delete(
        record_items::table.filter(record_items::record_id.eq_any(&record_ids)),
    )
    .execute(connection)?;
    let records = diesel::delete(
        inspection_records::table.filter(inspection_records::id.eq_any(&record_ids)),
    )
    .execute(connection)?;
    let tasks = diesel::delete(
        inspection_tasks::table.filter(inspection_tasks::id.eq_any(task_ids)),
    )
    .execute(connection)?;

    Ok(DeletionManifest {
        tasks: u64::try_from(tasks).unwrap_or(u64::MAX),
        records: u64::try_from(records).unwrap_or(u64::MAX),
        items: u64::try_from(items).unwrap_or(u64::MAX),
        photos: u64::try_from(photos).unwrap_or(u64::MAX),
        photo_handles: photo_paths.into_iter().map(PhotoHandle::new).collect(),
    })
}

fn to_new_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        schedule_id: task.schedule_id().into_inner(),
        checkpoint_id: task.checkpoint_id().into_inner(),
        due_time: task.due_time(),
        window_start: task.window_start(),
        window_end: task.window_end(),
        status: task.status().as_str().to_owned(),
        completed_at: task.completed_at(),
        created_at: task.created_at(),
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let status = TaskStatus::try_from(row.status.as_str())
        .map_err(|err| TaskRepositoryError::Corrupt(format!("task {}: {err}", row.id)))?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        schedule_id: ScheduleId::from_uuid(row.schedule_id),
        checkpoint_id: CheckpointId::from_uuid(row.checkpoint_id),
        due_time: row.due_time,
        window_start: row.window_start,
        window_end: row.window_end,
        status,
        completed_at: row.completed_at,
        created_at: row.created_at,
    }))
}
