//! Diesel row models for inspection persistence.

use super::schema::{
    inspection_records, inspection_tasks, record_items, record_photos, task_schedules,
};
use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for schedules.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScheduleRow {
    /// Schedule identifier.
    pub id: uuid::Uuid,
    /// Checkpoint the schedule covers.
    pub checkpoint_id: uuid::Uuid,
    /// Minutes between due times.
    pub frequency_minutes: i32,
    /// Start of the daily active span.
    pub start_time: NaiveTime,
    /// End of the daily active span.
    pub end_time: NaiveTime,
    /// Active weekdays in comma-separated form.
    pub active_days: String,
    /// Submission-window half-width in minutes.
    pub window_minutes: i32,
    /// Whether the schedule currently generates tasks.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for schedules.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_schedules)]
pub struct NewScheduleRow {
    /// Schedule identifier.
    pub id: uuid::Uuid,
    /// Checkpoint the schedule covers.
    pub checkpoint_id: uuid::Uuid,
    /// Minutes between due times.
    pub frequency_minutes: i32,
    /// Start of the daily active span.
    pub start_time: NaiveTime,
    /// End of the daily active span.
    pub end_time: NaiveTime,
    /// Active weekdays in comma-separated form.
    pub active_days: String,
    /// Submission-window half-width in minutes.
    pub window_minutes: i32,
    /// Whether the schedule currently generates tasks.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inspection_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Originating schedule.
    pub schedule_id: uuid::Uuid,
    /// Checkpoint the task inspects.
    pub checkpoint_id: uuid::Uuid,
    /// Nominal due instant.
    pub due_time: DateTime<Utc>,
    /// Earliest accepted submission instant.
    pub window_start: DateTime<Utc>,
    /// Latest accepted submission instant.
    pub window_end: DateTime<Utc>,
    /// Stored lifecycle status.
    pub status: String,
    /// Completion instant, when completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for tasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inspection_tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Originating schedule.
    pub schedule_id: uuid::Uuid,
    /// Checkpoint the task inspects.
    pub checkpoint_id: uuid::Uuid,
    /// Nominal due instant.
    pub due_time: DateTime<Utc>,
    /// Earliest accepted submission instant.
    pub window_start: DateTime<Utc>,
    /// Latest accepted submission instant.
    pub window_end: DateTime<Utc>,
    /// Stored lifecycle status.
    pub status: String,
    /// Completion instant, when completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = inspection_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Task the record closes.
    pub task_id: uuid::Uuid,
    /// Checkpoint the record inspects.
    pub checkpoint_id: uuid::Uuid,
    /// Submitting inspector.
    pub inspector_id: uuid::Uuid,
    /// Compliance classification.
    pub compliance_status: String,
    /// GPS latitude.
    pub gps_lat: Option<f64>,
    /// GPS longitude.
    pub gps_lng: Option<f64>,
    /// GPS accuracy in meters.
    pub gps_accuracy: Option<f64>,
    /// Submitting device description.
    pub device_info: Option<String>,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Administrative review state.
    pub review_status: String,
    /// Reviewing administrator, when reviewed.
    pub reviewer_id: Option<uuid::Uuid>,
    /// Review comment, when any.
    pub review_comment: Option<String>,
    /// Review instant, when reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Insert model for records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inspection_records)]
pub struct NewRecordRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Task the record closes.
    pub task_id: uuid::Uuid,
    /// Checkpoint the record inspects.
    pub checkpoint_id: uuid::Uuid,
    /// Submitting inspector.
    pub inspector_id: uuid::Uuid,
    /// Compliance classification.
    pub compliance_status: String,
    /// GPS latitude.
    pub gps_lat: Option<f64>,
    /// GPS longitude.
    pub gps_lng: Option<f64>,
    /// GPS accuracy in meters.
    pub gps_accuracy: Option<f64>,
    /// Submitting device description.
    pub device_info: Option<String>,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Administrative review state.
    pub review_status: String,
    /// Reviewing administrator, when reviewed.
    pub reviewer_id: Option<uuid::Uuid>,
    /// Review comment, when any.
    pub review_comment: Option<String>,
    /// Review instant, when reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Query result row for answered items.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = record_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordItemRow {
    /// Item row identifier.
    pub id: uuid::Uuid,
    /// Owning record.
    pub record_id: uuid::Uuid,
    /// Stable catalog key.
    pub item_key: String,
    /// Human-readable name at submission time.
    pub item_name: String,
    /// Input kind.
    pub input_type: String,
    /// Submitted value, when any.
    pub value: Option<String>,
}

/// Insert model for answered items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = record_items)]
pub struct NewRecordItemRow {
    /// Item row identifier.
    pub id: uuid::Uuid,
    /// Owning record.
    pub record_id: uuid::Uuid,
    /// Stable catalog key.
    pub item_key: String,
    /// Human-readable name at submission time.
    pub item_name: String,
    /// Input kind.
    pub input_type: String,
    /// Submitted value, when any.
    pub value: Option<String>,
}

/// Query result row for stored photos.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = record_photos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecordPhotoRow {
    /// Photo row identifier.
    pub id: uuid::Uuid,
    /// Owning record.
    pub record_id: uuid::Uuid,
    /// Relative storage path.
    pub file_path: String,
    /// Original client-side file name.
    pub original_name: Option<String>,
    /// Stored file size in bytes.
    pub file_size: i64,
    /// Hex sha256 of the raw content.
    pub content_hash: String,
    /// Free-form watermark metadata.
    pub watermark_info: Option<Value>,
    /// Claimed capture instant.
    pub taken_at: DateTime<Utc>,
}

/// Insert model for stored photos.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = record_photos)]
pub struct NewRecordPhotoRow {
    /// Photo row identifier.
    pub id: uuid::Uuid,
    /// Owning record.
    pub record_id: uuid::Uuid,
    /// Relative storage path.
    pub file_path: String,
    /// Original client-side file name.
    pub original_name: Option<String>,
    /// Stored file size in bytes.
    pub file_size: i64,
    /// Hex sha256 of the raw content.
    pub content_hash: String,
    /// Free-form watermark metadata.
    pub watermark_info: Option<Value>,
    /// Claimed capture instant.
    pub taken_at: DateTime<Utc>,
}
