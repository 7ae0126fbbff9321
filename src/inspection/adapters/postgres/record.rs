//! `PostgreSQL` repository implementation for inspection-record storage.

use super::{
    InspectionPgPool,
    models::{NewRecordItemRow, NewRecordPhotoRow, NewRecordRow, RecordItemRow, RecordPhotoRow, RecordRow},
    schema::{inspection_records, inspection_tasks, record_items, record_photos},
};
use crate::inspection::{
    domain::{
        AnswerItem, CheckpointId, ComplianceStatus, GpsFix, InspectionRecord, PersistedRecordData,
        PhotoHandle, RecordId, RecordPhoto, ReviewDecision, ReviewStatus, TaskId, TaskStatus,
        UserId,
    },
    ports::{
        RecordRepository, RecordRepositoryError, RecordRepositoryResult, RecordSummary,
        ReviewOutcome,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::Error as DieselError;

/// `PostgreSQL`-backed record repository.
#[derive(Debug, Clone)]
pub struct PostgresRecordRepository {
    pool: InspectionPgPool,
}

impl PostgresRecordRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: InspectionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RecordRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RecordRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RecordRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RecordRepositoryError::persistence)?
    }
}

/// Transaction-internal error for the submit-and-complete unit of work.
enum CompletionTxError {
    NotPending,
    Db(DieselError),
}

impl From<DieselError> for CompletionTxError {
    fn from(err: DieselError) -> Self {
        Self::Db(err)
    }
}

#[async_trait]
impl RecordRepository for PostgresRecordRepository {
    async fn create_completing(&self, record: &InspectionRecord) -> RecordRepositoryResult<()> {
        let task_id = record.task_id();
        let new_record = to_new_row(record);
        let new_items: Vec<NewRecordItemRow> = record
            .items()
            .iter()
            .map(|item| to_new_item_row(record.id(), item))
            .collect();
        let new_photos: Vec<NewRecordPhotoRow> = record
            .photos()
            .iter()
            .map(|photo| to_new_photo_row(record.id(), photo))
            .collect();
        let completed_at = record.submitted_at();

        self.run_blocking(move |connection| {
            let outcome = connection.transaction::<(), CompletionTxError, _>(|connection| {
                // Compare-and-set on the task row: of two concurrent
                // submissions for the same task, exactly one sees a pending
                // row here and wins.
                let claimed = diesel::update(
                    inspection_tasks::table
                        .filter(inspection_tasks::id.eq(task_id.into_inner()))
                        .filter(inspection_tasks::status.eq(TaskStatus::Pending.as_str())),
                )
                .set((
                    inspection_tasks::status.eq(TaskStatus::Completed.as_str()),
                    inspection_tasks::completed_at.eq(Some(completed_at)),
                ))
                .execute(connection)?;

                if claimed == 0 {
                    return Err(CompletionTxError::NotPending);
                }

                diesel::insert_into(inspection_records::table)
                    .values(&new_record)
                    .execute(connection)?;
                if !new_items.is_empty() {
                    diesel::insert_into(record_items::table)
                        .values(&new_items)
                        .execute(connection)?;
                }
                if !new_photos.is_empty() {
                    diesel::insert_into(record_photos::table)
                        .values(&new_photos)
                        .execute(connection)?;
                }
                Ok(())
            });

            match outcome {
                Ok(()) => Ok(()),
                Err(CompletionTxError::NotPending) => {
                    Err(RecordRepositoryError::TaskNotPending(task_id))
                }
                Err(CompletionTxError::Db(err)) => Err(RecordRepositoryError::persistence(err)),
            }
        })
        .await
    }

    async fn find_by_id(&self, id: RecordId) -> RecordRepositoryResult<Option<InspectionRecord>> {
        self.run_blocking(move |connection| {
            let Some(row) = inspection_records::table
                .filter(inspection_records::id.eq(id.into_inner()))
                .select(RecordRow::as_select())
                .first::<RecordRow>(connection)
                .optional()
                .map_err(RecordRepositoryError::persistence)?
            else {
                return Ok(None);
            };

            let item_rows = record_items::table
                .filter(record_items::record_id.eq(id.into_inner()))
                .select(RecordItemRow::as_select())
                .load::<RecordItemRow>(connection)
                .map_err(RecordRepositoryError::persistence)?;
            let photo_rows = record_photos::table
                .filter(record_photos::record_id.eq(id.into_inner()))
                .order(record_photos::taken_at.asc())
                .select(RecordPhotoRow::as_select())
                .load::<RecordPhotoRow>(connection)
                .map_err(RecordRepositoryError::persistence)?;

            row_to_record(row, item_rows, photo_rows).map(Some)
        })
        .await
    }

    async fn latest_for_checkpoint_since(
        &self,
        checkpoint_id: CheckpointId,
        since: DateTime<Utc>,
    ) -> RecordRepositoryResult<Option<RecordSummary>> {
        self.run_blocking(move |connection| {
            let row = inspection_records::table
                .filter(inspection_records::checkpoint_id.eq(checkpoint_id.into_inner()))
                .filter(inspection_records::submitted_at.ge(since))
                .order(inspection_records::submitted_at.desc())
                .select((
                    inspection_records::id,
                    inspection_records::inspector_id,
                    inspection_records::submitted_at,
                ))
                .first::<(uuid::Uuid, uuid::Uuid, DateTime<Utc>)>(connection)
                .optional()
                .map_err(RecordRepositoryError::persistence)?;

            Ok(row.map(|(id, inspector_id, submitted_at)| RecordSummary {
                id: RecordId::from_uuid(id),
                inspector_id: UserId::from_uuid(inspector_id),
                submitted_at,
            }))
        })
        .await
    }

    async fn review(
        &self,
        id: RecordId,
        decision: ReviewDecision,
        reviewer: UserId,
        comment: Option<String>,
        now: DateTime<Utc>,
    ) -> RecordRepositoryResult<ReviewOutcome> {
        self.run_blocking(move |connection| {
            // Compare-and-set on review_status: racing administrators
            // produce exactly one effective decision.
            let updated = diesel::update(
                inspection_records::table
                    .filter(inspection_records::id.eq(id.into_inner()))
                    .filter(inspection_records::review_status.eq(ReviewStatus::Pending.as_str())),
            )
            .set((
                inspection_records::review_status.eq(decision.as_status().as_str()),
                inspection_records::reviewer_id.eq(Some(reviewer.into_inner())),
                inspection_records::review_comment.eq(comment),
                inspection_records::reviewed_at.eq(Some(now)),
            ))
            .execute(connection)
            .map_err(RecordRepositoryError::persistence)?;

            if updated > 0 {
                return Ok(ReviewOutcome::Applied);
            }

            let settled = inspection_records::table
                .filter(inspection_records::id.eq(id.into_inner()))
                .select(inspection_records::review_status)
                .first::<String>(connection)
                .optional()
                .map_err(RecordRepositoryError::persistence)?;

            match settled {
                None => Err(RecordRepositoryError::NotFound(id)),
                Some(raw) => {
                    let status = ReviewStatus::try_from(raw.as_str()).map_err(|err| {
                        RecordRepositoryError::Corrupt(format!("record {id}: {err}"))
                    })?;
                    Ok(ReviewOutcome::AlreadyReviewed(status))
                }
            }
        })
        .await
    }
}

fn to_new_row(record: &InspectionRecord) -> NewRecordRow {
    NewRecordRow {
        id: record.id().into_inner(),
        task_id: record.task_id().into_inner(),
        checkpoint_id: record.checkpoint_id().into_inner(),
        inspector_id: record.inspector_id().into_inner(),
        compliance_status: record.compliance().as_str().to_owned(),
        gps_lat: record.gps().map(|fix| fix.latitude),
        gps_lng: record.gps().map(|fix| fix.longitude),
        gps_accuracy: record.gps().and_then(|fix| fix.accuracy_meters),
        device_info: record.device_info().map(str::to_owned),
        submitted_at: record.submitted_at(),
        review_status: record.review_status().as_str().to_owned(),
        reviewer_id: record.reviewer_id().map(UserId::into_inner),
        review_comment: record.review_comment().map(str::to_owned),
        reviewed_at: record.reviewed_at(),
    }
}

fn to_new_item_row(record_id: RecordId, item: &AnswerItem) -> NewRecordItemRow {
    NewRecordItemRow {
        id: uuid::Uuid::new_v4(),
        record_id: record_id.into_inner(),
        item_key: item.item_key.clone(),
        item_name: item.item_name.clone(),
        input_type: item.input_type.clone(),
        value: item.value.clone(),
    }
}

fn to_new_photo_row(record_id: RecordId, photo: &RecordPhoto) -> NewRecordPhotoRow {
    NewRecordPhotoRow {
        id: uuid::Uuid::new_v4(),
        record_id: record_id.into_inner(),
        file_path: photo.handle.as_str().to_owned(),
        original_name: photo.original_name.clone(),
        file_size: i64::try_from(photo.size_bytes).unwrap_or(i64::MAX),
        content_hash: photo.content_hash.clone(),
        watermark_info: photo.watermark.clone(),
        taken_at: photo.taken_at,
    }
}

fn row_to_record(
    row: RecordRow,
    item_rows: Vec<RecordItemRow>,
    photo_rows: Vec<RecordPhotoRow>,
) -> RecordRepositoryResult<InspectionRecord> {
    let compliance = ComplianceStatus::try_from(row.compliance_status.as_str())
        .map_err(|err| RecordRepositoryError::Corrupt(format!("record {}: {err}", row.id)))?;
    let review_status = ReviewStatus::try_from(row.review_status.as_str())
        .map_err(|err| RecordRepositoryError::Corrupt(format!("record {}: {err}", row.id)))?;

    let gps = match (row.gps_lat, row.gps_lng) {
        (Some(latitude), Some(longitude)) => Some(GpsFix {
            latitude,
            longitude,
            accuracy_meters: row.gps_accuracy,
        }),
        _ => None,
    };

    let items = item_rows
        .into_iter()
        .map(|item| AnswerItem {
            item_key: item.item_key,
            item_name: item.item_name,
            input_type: item.input_type,
            value: item.value,
        })
        .collect();
    let photos = photo_rows
        .into_iter()
        .map(|photo| RecordPhoto {
            handle: PhotoHandle::new(photo.file_path),
            original_name: photo.original_name,
            size_bytes: u64::try_from(photo.file_size).unwrap_or_default(),
            content_hash: photo.content_hash,
            watermark: photo.watermark_info,
            taken_at: photo.taken_at,
        })
        .collect();

    Ok(InspectionRecord::from_persisted(PersistedRecordData {
        id: RecordId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        checkpoint_id: CheckpointId::from_uuid(row.checkpoint_id),
        inspector_id: UserId::from_uuid(row.inspector_id),
        compliance,
        gps,
        device_info: row.device_info,
        submitted_at: row.submitted_at,
        review_status,
        reviewer_id: row.reviewer_id.map(UserId::from_uuid),
        review_comment: row.review_comment,
        reviewed_at: row.reviewed_at,
        items,
        photos,
    }))
}
