//! Task aggregate root and lifecycle status types.

use super::{CheckpointId, ComplianceStatus, ParseTaskStatusError, Schedule, ScheduleId, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Stored task lifecycle status.
///
/// `Completed` and `Overdue` are terminal: an overdue task is never revived
/// by a late submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Awaiting submission.
    Pending,
    /// Closed by a successful submission.
    Completed,
    /// Window elapsed without a submission.
    Overdue,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// One concrete, time-boxed inspection obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    schedule_id: ScheduleId,
    checkpoint_id: CheckpointId,
    due_time: DateTime<Utc>,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    status: TaskStatus,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
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
    /// Stored lifecycle status.
    pub status: TaskStatus,
    /// Completion instant, when completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task generated from a schedule for a due instant.
    ///
    /// The submission window is `due_time ± schedule.window_half_width()`.
    #[must_use]
    pub fn generated(schedule: &Schedule, due_time: DateTime<Utc>, clock: &impl Clock) -> Self {
        let half_width = schedule.window_half_width();
        Self {
            id: TaskId::new(),
            schedule_id: schedule.id(),
            checkpoint_id: schedule.checkpoint_id(),
            due_time,
            window_start: due_time - half_width,
            window_end: due_time + half_width,
            status: TaskStatus::Pending,
            completed_at: None,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub const fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            schedule_id: data.schedule_id,
            checkpoint_id: data.checkpoint_id,
            due_time: data.due_time,
            window_start: data.window_start,
            window_end: data.window_end,
            status: data.status,
            completed_at: data.completed_at,
            created_at: data.created_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the originating schedule identifier.
    #[must_use]
    pub const fn schedule_id(&self) -> ScheduleId {
        self.schedule_id
    }

    /// Returns the checkpoint identifier.
    #[must_use]
    pub const fn checkpoint_id(&self) -> CheckpointId {
        self.checkpoint_id
    }

    /// Returns the nominal due instant.
    #[must_use]
    pub const fn due_time(&self) -> DateTime<Utc> {
        self.due_time
    }

    /// Returns the earliest accepted submission instant.
    #[must_use]
    pub const fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// Returns the latest accepted submission instant.
    #[must_use]
    pub const fn window_end(&self) -> DateTime<Utc> {
        self.window_end
    }

    /// Returns the stored lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the completion instant, when completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether a stored-pending task has outlived its window.
    ///
    /// This is the single predicate behind both the read-time status
    /// projection and the overdue sweep's write filter; keeping them the
    /// same expression prevents the two from drifting apart.
    #[must_use]
    pub fn is_effectively_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.window_end < now
    }

    /// Returns the status as reported by read queries: a pending task whose
    /// window has closed reads as overdue even before the sweep has
    /// physically updated it.
    #[must_use]
    pub fn effective_status(&self, now: DateTime<Utc>) -> TaskStatus {
        if self.is_effectively_overdue(now) {
            TaskStatus::Overdue
        } else {
            self.status
        }
    }

    /// Returns whether the task belongs in the staff work queue: due, still
    /// within its window, and stored pending.
    #[must_use]
    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        self.status == TaskStatus::Pending && self.due_time <= now && self.window_end >= now
    }

    /// Classifies a submission made at `now` against the window.
    ///
    /// Returns `None` when the window has closed (`now > window_end`, the
    /// boundary itself is accepted); early submissions classify as
    /// [`ComplianceStatus::Anomaly`] rather than being rejected. With a
    /// zero-width window only the exact due instant is on time.
    #[must_use]
    pub fn classify_submission(&self, now: DateTime<Utc>) -> Option<ComplianceStatus> {
        if now > self.window_end {
            return None;
        }
        if now < self.window_start {
            return Some(ComplianceStatus::Anomaly);
        }
        Some(ComplianceStatus::OnTime)
    }

    /// Transitions the task to completed at the given instant.
    ///
    /// Storage adapters enforce the pending-state compare-and-set; this
    /// method records the outcome on the aggregate.
    pub const fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
    }

    /// Transitions the task to overdue.
    pub const fn mark_overdue(&mut self) {
        self.status = TaskStatus::Overdue;
        self.completed_at = None;
    }
}
