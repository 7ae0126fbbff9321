//! Shared fixtures: a settable clock and domain builders.

use crate::inspection::domain::{
    CheckpointId, DailyWindow, Schedule, Task, WeekdaySet,
};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use std::sync::RwLock;

/// Clock serving a fixed instant that tests move explicitly.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    /// Creates a clock frozen at `now`.
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.write().expect("clock lock poisoned");
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock lock poisoned")
    }
}

/// Builds a UTC instant from date and time parts.
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("valid test timestamp")
}

/// Builds a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Builds a time of day.
pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time")
}

/// Builds an hourly nine-to-five schedule active every day, with the given
/// submission-window half-width.
pub fn hourly_schedule(clock: &impl Clock, window_half_width_minutes: u32) -> Schedule {
    Schedule::new(
        CheckpointId::new(),
        60,
        DailyWindow::new(time(9, 0), time(17, 0)).expect("valid window"),
        WeekdaySet::full(),
        window_half_width_minutes,
        clock,
    )
    .expect("valid schedule")
}

/// Builds a pending task from a schedule at the given due instant.
pub fn task_due_at(schedule: &Schedule, due: DateTime<Utc>, clock: &impl Clock) -> Task {
    Task::generated(schedule, due, clock)
}
