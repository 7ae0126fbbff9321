//! Submission validation and recording.
//!
//! Checks run in a fixed order, each short-circuiting with a distinct
//! rejection: task state, checkpoint cooldown, submission window, photo
//! capture-time drift, duplicate photo content, and minimum photo count.
//! The final persist flips the task pending to completed atomically, so a
//! submission that loses a race never produces a duplicate record.

use crate::config::PatrolConfig;
use crate::inspection::{
    domain::{
        AnswerItem, ComplianceStatus, GpsFix, InspectionRecord, RecordId, RecordPhoto, Task,
        TaskId, TaskStatus, UserId,
    },
    ports::{
        PhotoStore, PhotoStoreError, RecordRepository, RecordRepositoryError, TaskRepository,
        TaskRepositoryError,
    },
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Validation knobs for the submission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionPolicy {
    /// Minimum spacing between submissions for one checkpoint.
    pub cooldown_minutes: u32,
    /// Maximum tolerated photo capture-time drift.
    pub photo_drift_minutes: u32,
    /// Minimum number of photos per submission.
    pub min_photos: usize,
}

impl From<&PatrolConfig> for SubmissionPolicy {
    fn from(config: &PatrolConfig) -> Self {
        Self {
            cooldown_minutes: config.cooldown_minutes,
            photo_drift_minutes: config.photo_drift_minutes,
            min_photos: config.min_photos,
        }
    }
}

/// One photo uploaded with a submission, before storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Raw photo bytes.
    pub bytes: Vec<u8>,
    /// Original client-side file name, when known.
    pub original_name: Option<String>,
    /// Capture instant claimed by the client.
    pub taken_at: DateTime<Utc>,
    /// Free-form watermark metadata captured by the client.
    pub watermark: Option<serde_json::Value>,
}

/// Submission payload for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    /// Task being closed.
    pub task_id: TaskId,
    /// Submitting inspector.
    pub inspector_id: UserId,
    /// Answered inspection items.
    pub items: Vec<AnswerItem>,
    /// Uploaded photos.
    pub photos: Vec<PhotoUpload>,
    /// GPS fix, when captured.
    pub gps: Option<GpsFix>,
    /// Submitting device description.
    pub device_info: Option<String>,
}

/// Outcome of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Created record.
    pub record_id: RecordId,
    /// Completed task.
    pub task_id: TaskId,
    /// Compliance classification applied.
    pub compliance: ComplianceStatus,
    /// Submission instant.
    pub submitted_at: DateTime<Utc>,
}

/// Rejections and failures of the submission pipeline.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task is no longer open for submission.
    #[error("task {task_id} is {status} and cannot accept a submission", status = .status.as_str())]
    TaskNotPending {
        /// Task that was submitted against.
        task_id: TaskId,
        /// Its effective status at submit time.
        status: TaskStatus,
    },

    /// Another submission for the checkpoint landed too recently.
    #[error("checkpoint was inspected recently; retry in {remaining_minutes} min")]
    CooldownActive {
        /// Whole minutes until the cooldown expires.
        remaining_minutes: u32,
    },

    /// The submission window has closed.
    #[error("submission window closed at {window_end}")]
    WindowClosed {
        /// Latest instant the task accepted submissions.
        window_end: DateTime<Utc>,
    },

    /// A photo's claimed capture time is too far from the submission
    /// instant.
    #[error("photo capture time {taken_at} drifts more than {limit_minutes} min from submission")]
    PhotoTimeDrift {
        /// Claimed capture instant.
        taken_at: DateTime<Utc>,
        /// Maximum tolerated drift.
        limit_minutes: u32,
    },

    /// Two photos in one submission have identical content.
    #[error("duplicate photo content (sha256 {content_hash})")]
    DuplicatePhoto {
        /// Hash shared by the duplicate photos.
        content_hash: String,
    },

    /// Fewer photos than the policy requires.
    #[error("at least {required} photo(s) required")]
    NotEnoughPhotos {
        /// Minimum photo count.
        required: usize,
    },

    /// The persist-time compare-and-set found the task already closed; the
    /// submission lost a completion race.
    #[error("task {0} was completed concurrently")]
    CompletionConflict(TaskId),

    /// Task persistence failed.
    #[error(transparent)]
    Task(#[from] TaskRepositoryError),

    /// Record persistence failed.
    #[error(transparent)]
    Record(RecordRepositoryError),

    /// Photo storage failed.
    #[error(transparent)]
    PhotoStore(#[from] PhotoStoreError),
}

/// Result type for submission operations.
pub type SubmissionResult<T> = Result<T, SubmissionError>;

/// Validates and records checkpoint inspections.
pub struct SubmissionService<T, R, P, C>
where
    T: TaskRepository,
    R: RecordRepository,
    P: PhotoStore,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    records: Arc<R>,
    photos: Arc<P>,
    clock: Arc<C>,
    policy: SubmissionPolicy,
}

impl<T, R, P, C> Clone for SubmissionService<T, R, P, C>
where
    T: TaskRepository,
    R: RecordRepository,
    P: PhotoStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            records: Arc::clone(&self.records),
            photos: Arc::clone(&self.photos),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<T, R, P, C> SubmissionService<T, R, P, C>
where
    T: TaskRepository,
    R: RecordRepository,
    P: PhotoStore,
    C: Clock + Send + Sync,
{
    /// Creates a new submission service.
    #[must_use]
    pub const fn new(
        tasks: Arc<T>,
        records: Arc<R>,
        photos: Arc<P>,
        clock: Arc<C>,
        policy: SubmissionPolicy,
    ) -> Self {
        Self {
            tasks,
            records,
            photos,
            clock,
            policy,
        }
    }

    /// Runs the full validation pipeline and, on success, persists the
    /// record while completing the task in one storage transaction.
    ///
    /// Early submissions (before the window opens) are accepted and
    /// classified [`ComplianceStatus::Anomaly`]; the window-end boundary
    /// itself is accepted. Photos rejected after some files were stored
    /// leave those files orphaned; retention cleanup has no record of them
    /// and they are written off.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`SubmissionError`].
    pub async fn submit(&self, request: SubmissionRequest) -> SubmissionResult<SubmissionReceipt> {
        let now = self.clock.utc();

        let task = self
            .tasks
            .find_by_id(request.task_id)
            .await?
            .ok_or(SubmissionError::TaskNotFound(request.task_id))?;
        if task.status() != TaskStatus::Pending {
            return Err(SubmissionError::TaskNotPending {
                task_id: task.id(),
                status: task.effective_status(now),
            });
        }

        self.check_cooldown(&task, now).await?;

        let compliance = task
            .classify_submission(now)
            .ok_or(SubmissionError::WindowClosed {
                window_end: task.window_end(),
            })?;

        let drift_limit = Duration::minutes(i64::from(self.policy.photo_drift_minutes));
        for photo in &request.photos {
            let drift = (now - photo.taken_at).abs();
            if drift > drift_limit {
                return Err(SubmissionError::PhotoTimeDrift {
                    taken_at: photo.taken_at,
                    limit_minutes: self.policy.photo_drift_minutes,
                });
            }
        }

        let stored = self.store_photos(request.photos).await?;
        if stored.len() < self.policy.min_photos {
            return Err(SubmissionError::NotEnoughPhotos {
                required: self.policy.min_photos,
            });
        }

        let record = InspectionRecord::submitted(
            task.id(),
            task.checkpoint_id(),
            request.inspector_id,
            compliance,
            request.items,
            stored,
            request.gps,
            request.device_info,
            now,
        );
        self.records
            .create_completing(&record)
            .await
            .map_err(|err| match err {
                RecordRepositoryError::TaskNotPending(id) => {
                    SubmissionError::CompletionConflict(id)
                }
                other => SubmissionError::Record(other),
            })?;

        debug!(record_id = %record.id(), task_id = %task.id(), compliance = compliance.as_str(), "submission recorded");
        Ok(SubmissionReceipt {
            record_id: record.id(),
            task_id: task.id(),
            compliance,
            submitted_at: now,
        })
    }

    async fn check_cooldown(
        &self,
        task: &Task,
        now: DateTime<Utc>,
    ) -> SubmissionResult<()> {
        let cooldown = i64::from(self.policy.cooldown_minutes);
        let since = now - Duration::minutes(cooldown);
        let latest = self
            .records
            .latest_for_checkpoint_since(task.checkpoint_id(), since)
            .await
            .map_err(SubmissionError::Record)?;

        if let Some(previous) = latest {
            let elapsed_minutes = (now - previous.submitted_at).num_minutes();
            let remaining = cooldown - elapsed_minutes;
            if remaining > 0 {
                return Err(SubmissionError::CooldownActive {
                    remaining_minutes: u32::try_from(remaining).unwrap_or(u32::MAX),
                });
            }
        }
        Ok(())
    }

    async fn store_photos(
        &self,
        uploads: Vec<PhotoUpload>,
    ) -> SubmissionResult<Vec<RecordPhoto>> {
        let mut hashes = HashSet::new();
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let file = self.photos.store(&upload.bytes).await?;
            if !hashes.insert(file.content_hash.clone()) {
                return Err(SubmissionError::DuplicatePhoto {
                    content_hash: file.content_hash,
                });
            }
            stored.push(RecordPhoto {
                handle: file.handle,
                original_name: upload.original_name,
                size_bytes: file.size_bytes,
                content_hash: file.content_hash,
                watermark: upload.watermark,
                taken_at: upload.taken_at,
            });
        }
        Ok(stored)
    }
}
