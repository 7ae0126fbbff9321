//! Domain model for inspection scheduling and task lifecycle.
//!
//! The domain models recurrence rules, the tasks they materialize into, and
//! the inspection records that close those tasks, while keeping all
//! infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod record;
mod schedule;
mod task;

pub use error::{
    InspectionDomainError, ParseComplianceStatusError, ParseReviewStatusError,
    ParseTaskStatusError,
};
pub use ids::{AreaId, CheckpointId, RecordId, ScheduleId, TaskId, UserId};
pub use record::{
    AnswerItem, ComplianceStatus, GpsFix, InspectionRecord, PersistedRecordData, PhotoHandle,
    RecordPhoto, ReviewDecision, ReviewStatus,
};
pub use schedule::{DailyWindow, PersistedScheduleData, Schedule, WeekdaySet};
pub use task::{PersistedTaskData, Task, TaskStatus};
