//! Inspection record aggregate and submission value types.

use super::{
    CheckpointId, ParseComplianceStatusError, ParseReviewStatusError, RecordId, TaskId, UserId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compliance classification derived at submission time.
///
/// Late submissions are rejected outright and never recorded, so there is no
/// "late" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// Submitted within the task window.
    OnTime,
    /// Submitted before the window opened.
    Anomaly,
}

impl ComplianceStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Anomaly => "anomaly",
        }
    }
}

impl TryFrom<&str> for ComplianceStatus {
    type Error = ParseComplianceStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on_time" => Ok(Self::OnTime),
            "anomaly" => Ok(Self::Anomaly),
            _ => Err(ParseComplianceStatusError(value.to_owned())),
        }
    }
}

/// Administrative review state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Not yet reviewed.
    Pending,
    /// Reviewed and accepted.
    Approved,
    /// Reviewed and marked for sanction.
    Punished,
}

impl ReviewStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Punished => "punished",
        }
    }
}

impl TryFrom<&str> for ReviewStatus {
    type Error = ParseReviewStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "punished" => Ok(Self::Punished),
            _ => Err(ParseReviewStatusError(value.to_owned())),
        }
    }
}

/// Decision an administrator applies to a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Accept the record.
    Approved,
    /// Mark the record for sanction.
    Punished,
}

impl ReviewDecision {
    /// Returns the review status this decision settles the record into.
    #[must_use]
    pub const fn as_status(self) -> ReviewStatus {
        match self {
            Self::Approved => ReviewStatus::Approved,
            Self::Punished => ReviewStatus::Punished,
        }
    }
}

/// Opaque reference to a stored photo file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoHandle(String);

impl PhotoHandle {
    /// Creates a handle from the storage-assigned path string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the handle as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PhotoHandle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PhotoHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One answered inspection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerItem {
    /// Stable item key from the inspection-item catalog.
    pub item_key: String,
    /// Human-readable item name at submission time.
    pub item_name: String,
    /// Input kind (`radio`, `text`, ...).
    pub input_type: String,
    /// Submitted value, when any.
    pub value: Option<String>,
}

/// One stored photo attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPhoto {
    /// Storage handle for the photo file.
    pub handle: PhotoHandle,
    /// Original client-side file name, when known.
    pub original_name: Option<String>,
    /// Stored file size in bytes.
    pub size_bytes: u64,
    /// Hex sha256 of the raw photo content.
    pub content_hash: String,
    /// Free-form watermark metadata captured by the client.
    pub watermark: Option<serde_json::Value>,
    /// Claimed capture instant.
    pub taken_at: DateTime<Utc>,
}

/// GPS fix captured at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported accuracy in meters, when available.
    pub accuracy_meters: Option<f64>,
}

/// Inspection record closing exactly one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    id: RecordId,
    task_id: TaskId,
    checkpoint_id: CheckpointId,
    inspector_id: UserId,
    compliance: ComplianceStatus,
    gps: Option<GpsFix>,
    device_info: Option<String>,
    submitted_at: DateTime<Utc>,
    review_status: ReviewStatus,
    reviewer_id: Option<UserId>,
    review_comment: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    items: Vec<AnswerItem>,
    photos: Vec<RecordPhoto>,
}

/// Parameter object for reconstructing a persisted record aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRecordData {
    /// Persisted record identifier.
    pub id: RecordId,
    /// Task the record closes.
    pub task_id: TaskId,
    /// Checkpoint the record inspects.
    pub checkpoint_id: CheckpointId,
    /// Submitting inspector.
    pub inspector_id: UserId,
    /// Compliance classification.
    pub compliance: ComplianceStatus,
    /// GPS fix, when captured.
    pub gps: Option<GpsFix>,
    /// Submitting device description.
    pub device_info: Option<String>,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
    /// Review state.
    pub review_status: ReviewStatus,
    /// Reviewing administrator, when reviewed.
    pub reviewer_id: Option<UserId>,
    /// Review comment, when any.
    pub review_comment: Option<String>,
    /// Review instant, when reviewed.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Answered items.
    pub items: Vec<AnswerItem>,
    /// Stored photos.
    pub photos: Vec<RecordPhoto>,
}

impl InspectionRecord {
    /// Creates a freshly submitted record awaiting review.
    #[must_use]
    #[expect(clippy::too_many_arguments, reason = "submission captures this many independent facts")]
    pub fn submitted(
        task_id: TaskId,
        checkpoint_id: CheckpointId,
        inspector_id: UserId,
        compliance: ComplianceStatus,
        items: Vec<AnswerItem>,
        photos: Vec<RecordPhoto>,
        gps: Option<GpsFix>,
        device_info: Option<String>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RecordId::new(),
            task_id,
            checkpoint_id,
            inspector_id,
            compliance,
            gps,
            device_info,
            submitted_at,
            review_status: ReviewStatus::Pending,
            reviewer_id: None,
            review_comment: None,
            reviewed_at: None,
            items,
            photos,
        }
    }

    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRecordData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            checkpoint_id: data.checkpoint_id,
            inspector_id: data.inspector_id,
            compliance: data.compliance,
            gps: data.gps,
            device_info: data.device_info,
            submitted_at: data.submitted_at,
            review_status: data.review_status,
            reviewer_id: data.reviewer_id,
            review_comment: data.review_comment,
            reviewed_at: data.reviewed_at,
            items: data.items,
            photos: data.photos,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Returns the task this record closes.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the inspected checkpoint.
    #[must_use]
    pub const fn checkpoint_id(&self) -> CheckpointId {
        self.checkpoint_id
    }

    /// Returns the submitting inspector.
    #[must_use]
    pub const fn inspector_id(&self) -> UserId {
        self.inspector_id
    }

    /// Returns the compliance classification.
    #[must_use]
    pub const fn compliance(&self) -> ComplianceStatus {
        self.compliance
    }

    /// Returns the GPS fix, when captured.
    #[must_use]
    pub const fn gps(&self) -> Option<GpsFix> {
        self.gps
    }

    /// Returns the submitting device description.
    #[must_use]
    pub fn device_info(&self) -> Option<&str> {
        self.device_info.as_deref()
    }

    /// Returns the submission instant.
    #[must_use]
    pub const fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Returns the review state.
    #[must_use]
    pub const fn review_status(&self) -> ReviewStatus {
        self.review_status
    }

    /// Returns the reviewing administrator, when reviewed.
    #[must_use]
    pub const fn reviewer_id(&self) -> Option<UserId> {
        self.reviewer_id
    }

    /// Returns the review comment, when any.
    #[must_use]
    pub fn review_comment(&self) -> Option<&str> {
        self.review_comment.as_deref()
    }

    /// Returns the review instant, when reviewed.
    #[must_use]
    pub const fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    /// Returns the answered items.
    #[must_use]
    pub fn items(&self) -> &[AnswerItem] {
        &self.items
    }

    /// Returns the stored photos.
    #[must_use]
    pub fn photos(&self) -> &[RecordPhoto] {
        &self.photos
    }

    /// Applies a review decision. Storage adapters enforce the
    /// pending-review compare-and-set; this method records the outcome.
    pub fn apply_review(
        &mut self,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.review_status = decision.as_status();
        self.reviewer_id = Some(reviewer);
        self.review_comment = comment;
        self.reviewed_at = Some(at);
    }
}
