//! `PostgreSQL` repository implementation for recurrence-schedule storage.

use super::{
    InspectionPgPool,
    models::{NewScheduleRow, ScheduleRow},
    schema::task_schedules,
};
use crate::inspection::{
    domain::{
        CheckpointId, DailyWindow, PersistedScheduleData, Schedule, ScheduleId, WeekdaySet,
    },
    ports::{ScheduleRepository, ScheduleRepositoryError, ScheduleRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed schedule repository.
#[derive(Debug, Clone)]
pub struct PostgresScheduleRepository {
    pool: InspectionPgPool,
}

impl PostgresScheduleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: InspectionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ScheduleRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ScheduleRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ScheduleRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ScheduleRepositoryError::persistence)?
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn insert(&self, schedule: &Schedule) -> ScheduleRepositoryResult<()> {
        let schedule_id = schedule.id();
        let new_row = to_new_row(schedule);

        self.run_blocking(move |connection| {
            diesel::insert_into(task_schedules::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ScheduleRepositoryError::DuplicateSchedule(schedule_id)
                    }
                    _ => ScheduleRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ScheduleId) -> ScheduleRepositoryResult<Option<Schedule>> {
        self.run_blocking(move |connection| {
            let row = task_schedules::table
                .filter(task_schedules::id.eq(id.into_inner()))
                .select(ScheduleRow::as_select())
                .first::<ScheduleRow>(connection)
                .optional()
                .map_err(ScheduleRepositoryError::persistence)?;
            row.map(row_to_schedule).transpose()
        })
        .await
    }

    async fn list_active(&self) -> ScheduleRepositoryResult<Vec<Schedule>> {
        self.run_blocking(move |connection| {
            let rows = task_schedules::table
                .filter(task_schedules::enabled.eq(true))
                .order(task_schedules::created_at.asc())
                .select(ScheduleRow::as_select())
                .load::<ScheduleRow>(connection)
                .map_err(ScheduleRepositoryError::persistence)?;
            rows.into_iter().map(row_to_schedule).collect()
        })
        .await
    }

    async fn set_enabled(
        &self,
        id: ScheduleId,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> ScheduleRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                task_schedules::table.filter(task_schedules::id.eq(id.into_inner())),
            )
            .set((
                task_schedules::enabled.eq(enabled),
                task_schedules::updated_at.eq(now),
            ))
            .execute(connection)
            .map_err(ScheduleRepositoryError::persistence)?;

            if updated == 0 {
                return Err(ScheduleRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn to_new_row(schedule: &Schedule) -> NewScheduleRow {
    NewScheduleRow {
        id: schedule.id().into_inner(),
        checkpoint_id: schedule.checkpoint_id().into_inner(),
        frequency_minutes: i32::try_from(schedule.frequency_minutes()).unwrap_or(i32::MAX),
        start_time: schedule.daily_window().start(),
        end_time: schedule.daily_window().end(),
        active_days: schedule.active_days().to_csv(),
        window_minutes: i32::try_from(schedule.window_half_width_minutes()).unwrap_or(i32::MAX),
        enabled: schedule.enabled(),
        created_at: schedule.created_at(),
        updated_at: schedule.updated_at(),
    }
}

fn row_to_schedule(row: ScheduleRow) -> ScheduleRepositoryResult<Schedule> {
    let frequency_minutes = u32::try_from(row.frequency_minutes).map_err(|_| {
        ScheduleRepositoryError::Corrupt(format!(
            "negative frequency {} on schedule {}",
            row.frequency_minutes, row.id
        ))
    })?;
    let window_half_width_minutes = u32::try_from(row.window_minutes).map_err(|_| {
        ScheduleRepositoryError::Corrupt(format!(
            "negative window half-width {} on schedule {}",
            row.window_minutes, row.id
        ))
    })?;
    let daily_window = DailyWindow::new(row.start_time, row.end_time).map_err(|err| {
        ScheduleRepositoryError::Corrupt(format!("schedule {}: {err}", row.id))
    })?;
    let active_days = WeekdaySet::from_csv(&row.active_days).map_err(|err| {
        ScheduleRepositoryError::Corrupt(format!("schedule {}: {err}", row.id))
    })?;

    Ok(Schedule::from_persisted(PersistedScheduleData {
        id: ScheduleId::from_uuid(row.id),
        checkpoint_id: CheckpointId::from_uuid(row.checkpoint_id),
        frequency_minutes,
        daily_window,
        active_days,
        window_half_width_minutes,
        enabled: row.enabled,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
