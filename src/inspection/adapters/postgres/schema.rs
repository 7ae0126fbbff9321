//! Diesel schema for inspection persistence.

diesel::table! {
    /// Recurrence rules producing tasks for checkpoints.
    task_schedules (id) {
        /// Schedule identifier.
        id -> Uuid,
        /// Checkpoint the schedule covers.
        checkpoint_id -> Uuid,
        /// Minutes between due times within the daily window.
        frequency_minutes -> Int4,
        /// Start of the daily active span.
        start_time -> Time,
        /// End of the daily active span.
        end_time -> Time,
        /// Active weekdays as a comma-separated list (1=Monday..7=Sunday).
        #[max_length = 20]
        active_days -> Varchar,
        /// Submission-window half-width in minutes.
        window_minutes -> Int4,
        /// Whether the schedule currently generates tasks.
        enabled -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Generated inspection task instances.
    ///
    /// A unique index on `(schedule_id, due_time)` backs generation dedup.
    inspection_tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Originating schedule.
        schedule_id -> Uuid,
        /// Checkpoint the task inspects.
        checkpoint_id -> Uuid,
        /// Nominal due instant.
        due_time -> Timestamptz,
        /// Earliest accepted submission instant.
        window_start -> Timestamptz,
        /// Latest accepted submission instant.
        window_end -> Timestamptz,
        /// Stored lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Completion instant, when completed.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Inspection records, one per completed task.
    inspection_records (id) {
        /// Record identifier.
        id -> Uuid,
        /// Task the record closes.
        task_id -> Uuid,
        /// Checkpoint the record inspects.
        checkpoint_id -> Uuid,
        /// Submitting inspector.
        inspector_id -> Uuid,
        /// Compliance classification.
        #[max_length = 20]
        compliance_status -> Varchar,
        /// GPS latitude in decimal degrees.
        gps_lat -> Nullable<Float8>,
        /// GPS longitude in decimal degrees.
        gps_lng -> Nullable<Float8>,
        /// Reported GPS accuracy in meters.
        gps_accuracy -> Nullable<Float8>,
        /// Submitting device description.
        #[max_length = 255]
        device_info -> Nullable<Varchar>,
        /// Submission instant.
        submitted_at -> Timestamptz,
        /// Administrative review state.
        #[max_length = 20]
        review_status -> Varchar,
        /// Reviewing administrator, when reviewed.
        reviewer_id -> Nullable<Uuid>,
        /// Review comment, when any.
        #[max_length = 500]
        review_comment -> Nullable<Varchar>,
        /// Review instant, when reviewed.
        reviewed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Answered inspection items belonging to a record.
    record_items (id) {
        /// Item row identifier.
        id -> Uuid,
        /// Owning record.
        record_id -> Uuid,
        /// Stable catalog key.
        #[max_length = 100]
        item_key -> Varchar,
        /// Human-readable name at submission time.
        #[max_length = 255]
        item_name -> Varchar,
        /// Input kind.
        #[max_length = 50]
        input_type -> Varchar,
        /// Submitted value, when any.
        #[max_length = 1000]
        value -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Stored photos belonging to a record.
    record_photos (id) {
        /// Photo row identifier.
        id -> Uuid,
        /// Owning record.
        record_id -> Uuid,
        /// Relative storage path of the photo file.
        #[max_length = 255]
        file_path -> Varchar,
        /// Original client-side file name.
        #[max_length = 255]
        original_name -> Nullable<Varchar>,
        /// Stored file size in bytes.
        file_size -> Int8,
        /// Hex sha256 of the raw photo content.
        #[max_length = 64]
        content_hash -> Varchar,
        /// Free-form watermark metadata.
        watermark_info -> Nullable<Jsonb>,
        /// Claimed capture instant.
        taken_at -> Timestamptz,
    }
}

diesel::joinable!(inspection_tasks -> task_schedules (schedule_id));
diesel::joinable!(inspection_records -> inspection_tasks (task_id));
diesel::joinable!(record_items -> inspection_records (record_id));
diesel::joinable!(record_photos -> inspection_records (record_id));

diesel::allow_tables_to_appear_in_same_query!(
    task_schedules,
    inspection_tasks,
    inspection_records,
    record_items,
    record_photos,
);
