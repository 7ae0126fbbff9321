//! Recurrence schedule aggregate and its validated value types.

use super::{CheckpointId, InspectionDomainError, ScheduleId};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Set of active weekdays, numbered 1 (Monday) through 7 (Sunday).
///
/// Persisted as a comma-separated list (`"1,2,3,4,5"`), the format the
/// schedule catalog has always used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(BTreeSet<u8>);

impl WeekdaySet {
    /// Creates a set covering every day of the week.
    #[must_use]
    pub fn full() -> Self {
        Self((1..=7).collect())
    }

    /// Creates a validated set from weekday numbers.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionDomainError::InvalidWeekday`] for numbers outside
    /// 1..=7 and [`InspectionDomainError::EmptyWeekdaySet`] when no number is
    /// supplied.
    pub fn from_numbers(
        numbers: impl IntoIterator<Item = u8>,
    ) -> Result<Self, InspectionDomainError> {
        let mut days = BTreeSet::new();
        for number in numbers {
            if !(1..=7).contains(&number) {
                return Err(InspectionDomainError::InvalidWeekday(number));
            }
            days.insert(number);
        }
        if days.is_empty() {
            return Err(InspectionDomainError::EmptyWeekdaySet);
        }
        Ok(Self(days))
    }

    /// Parses the persisted comma-separated form.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionDomainError::InvalidWeekday`] when a segment is
    /// not a weekday number, or [`InspectionDomainError::EmptyWeekdaySet`]
    /// for a blank value.
    pub fn from_csv(value: &str) -> Result<Self, InspectionDomainError> {
        let numbers = value
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .parse::<u8>()
                    .map_err(|_| InspectionDomainError::InvalidWeekday(0))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_numbers(numbers)
    }

    /// Returns whether the given weekday is active.
    #[must_use]
    pub fn contains(&self, weekday: chrono::Weekday) -> bool {
        let number = weekday.number_from_monday();
        u8::try_from(number).is_ok_and(|n| self.0.contains(&n))
    }

    /// Returns the persisted comma-separated form.
    #[must_use]
    pub fn to_csv(&self) -> String {
        let parts: Vec<String> = self.0.iter().map(u8::to_string).collect();
        parts.join(",")
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_csv())
    }
}

/// Daily active span within which due times are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl DailyWindow {
    /// Creates a validated daily window.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionDomainError::InvalidDailyWindow`] when `start` is
    /// after `end`. Equal bounds are valid and yield a single due time.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InspectionDomainError> {
        if start > end {
            return Err(InspectionDomainError::InvalidDailyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the start of the active span.
    #[must_use]
    pub const fn start(&self) -> NaiveTime {
        self.start
    }

    /// Returns the end of the active span.
    #[must_use]
    pub const fn end(&self) -> NaiveTime {
        self.end
    }

    /// Enumerates due times-of-day from `start`, stepping by
    /// `frequency_minutes`, up to and including `end`.
    ///
    /// A due time landing exactly on `end` is valid; the boundary is
    /// inclusive.
    #[must_use]
    pub fn due_times(&self, frequency_minutes: u32) -> Vec<NaiveTime> {
        if frequency_minutes == 0 {
            return Vec::new();
        }
        let step = frequency_minutes.saturating_mul(60);
        let end_secs = self.end.num_seconds_from_midnight();
        let mut times = Vec::new();
        let mut secs = self.start.num_seconds_from_midnight();
        while secs <= end_secs {
            if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt(secs, 0) {
                times.push(time);
            }
            match secs.checked_add(step) {
                Some(next) => secs = next,
                None => break,
            }
        }
        times
    }
}

/// Recurrence rule producing inspection tasks for one checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    id: ScheduleId,
    checkpoint_id: CheckpointId,
    frequency_minutes: u32,
    daily_window: DailyWindow,
    active_days: WeekdaySet,
    window_half_width_minutes: u32,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted schedule aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedScheduleData {
    /// Persisted schedule identifier.
    pub id: ScheduleId,
    /// Checkpoint the schedule belongs to.
    pub checkpoint_id: CheckpointId,
    /// Minutes between due times within the daily window.
    pub frequency_minutes: u32,
    /// Daily active span.
    pub daily_window: DailyWindow,
    /// Active weekdays.
    pub active_days: WeekdaySet,
    /// Half-width of each task's submission window, in minutes.
    pub window_half_width_minutes: u32,
    /// Whether the schedule currently generates tasks.
    pub enabled: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Schedule {
    /// Creates a new enabled schedule.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionDomainError::InvalidFrequency`] when the
    /// frequency is zero. Window and weekday invariants are enforced by
    /// [`DailyWindow`] and [`WeekdaySet`] construction.
    pub fn new(
        checkpoint_id: CheckpointId,
        frequency_minutes: u32,
        daily_window: DailyWindow,
        active_days: WeekdaySet,
        window_half_width_minutes: u32,
        clock: &impl Clock,
    ) -> Result<Self, InspectionDomainError> {
        if frequency_minutes == 0 {
            return Err(InspectionDomainError::InvalidFrequency(frequency_minutes));
        }
        let timestamp = clock.utc();
        Ok(Self {
            id: ScheduleId::new(),
            checkpoint_id,
            frequency_minutes,
            daily_window,
            active_days,
            window_half_width_minutes,
            enabled: true,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a schedule from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedScheduleData) -> Self {
        Self {
            id: data.id,
            checkpoint_id: data.checkpoint_id,
            frequency_minutes: data.frequency_minutes,
            daily_window: data.daily_window,
            active_days: data.active_days,
            window_half_width_minutes: data.window_half_width_minutes,
            enabled: data.enabled,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the schedule identifier.
    #[must_use]
    pub const fn id(&self) -> ScheduleId {
        self.id
    }

    /// Returns the checkpoint this schedule covers.
    #[must_use]
    pub const fn checkpoint_id(&self) -> CheckpointId {
        self.checkpoint_id
    }

    /// Returns the minutes between due times within the daily window.
    #[must_use]
    pub const fn frequency_minutes(&self) -> u32 {
        self.frequency_minutes
    }

    /// Returns the daily active span.
    #[must_use]
    pub const fn daily_window(&self) -> DailyWindow {
        self.daily_window
    }

    /// Returns the active weekday set.
    #[must_use]
    pub const fn active_days(&self) -> &WeekdaySet {
        &self.active_days
    }

    /// Returns the submission-window half-width in minutes.
    #[must_use]
    pub const fn window_half_width_minutes(&self) -> u32 {
        self.window_half_width_minutes
    }

    /// Returns the submission-window half-width as a duration.
    #[must_use]
    pub fn window_half_width(&self) -> Duration {
        Duration::minutes(i64::from(self.window_half_width_minutes))
    }

    /// Returns whether the schedule currently generates tasks.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Enables or disables future generation at the given instant.
    ///
    /// Disabling does not retroactively alter already-generated tasks.
    pub const fn set_enabled(&mut self, enabled: bool, at: DateTime<Utc>) {
        self.enabled = enabled;
        self.updated_at = at;
    }

    /// Returns the concrete due instants this schedule produces on `date`,
    /// or an empty list when the weekday is inactive.
    ///
    /// Due instants within one schedule are strictly increasing.
    #[must_use]
    pub fn due_times_on(&self, date: NaiveDate) -> Vec<DateTime<Utc>> {
        if !self.active_days.contains(date.weekday()) {
            return Vec::new();
        }
        self.daily_window
            .due_times(self.frequency_minutes)
            .into_iter()
            .map(|time| date.and_time(time).and_utc())
            .collect()
    }
}
