//! End-to-end lifecycle test against the in-memory adapters: generate
//! tasks from a schedule, submit an inspection, review the record, and
//! clean up after retention.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use mockable::Clock;
use patrol::config::PatrolConfig;
use patrol::inspection::{
    adapters::memory::{InMemoryInspectionStore, InMemoryPhotoStore},
    domain::{
        AnswerItem, CheckpointId, ComplianceStatus, DailyWindow, ReviewDecision, ReviewStatus,
        Schedule, TaskStatus, UserId, WeekdaySet,
    },
    ports::{PageRequest, RecordRepository, ReviewOutcome, TaskRepository},
    services::{
        PhotoUpload, ReviewService, SubmissionRequest, SubmissionService, TaskGenerator,
        TaskMaintenanceService,
    },
};
use std::sync::{Arc, RwLock};

/// Clock serving a fixed instant that the test moves explicitly.
struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(now),
        }
    }

    fn set(&self, now: DateTime<Utc>) {
        *self.now.write().expect("clock lock poisoned") = now;
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

fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_from_generation_to_retention() {
    let config = PatrolConfig::default();
    let store = Arc::new(InMemoryInspectionStore::new());
    let photos = Arc::new(InMemoryPhotoStore::new());
    let clock = Arc::new(FixedClock::at(utc(2026, 3, 2, 6, 0)));

    // One checkpoint inspected every two hours between 08:00 and 18:00,
    // weekdays only, with a 30-minute submission window either side.
    let checkpoint_id = CheckpointId::new();
    let schedule = Schedule::new(
        checkpoint_id,
        120,
        DailyWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).expect("valid time"),
            NaiveTime::from_hms_opt(18, 0, 0).expect("valid time"),
        )
        .expect("valid window"),
        WeekdaySet::from_numbers([1u8, 2, 3, 4, 5]).expect("valid weekday set"),
        30,
        &*clock,
    )
    .expect("valid schedule");
    patrol::inspection::ports::ScheduleRepository::insert(&*store, &schedule)
        .await
        .expect("schedule stored");

    // Generate Monday only: six two-hourly slots, end of day inclusive.
    let monday = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
    let generator = TaskGenerator::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&clock),
        config.generation_horizon_days,
    );
    let created = generator
        .generate(Some(monday), Some(monday))
        .await
        .expect("generation succeeds");
    assert_eq!(created, 6);

    // 10:05: the 10:00 task is available; submit an inspection for it.
    clock.set(utc(2026, 3, 2, 10, 5));
    let available = store
        .list_available(clock.utc(), PageRequest::default())
        .await
        .expect("listing succeeds");
    assert_eq!(available.total, 1);
    let task = available.items[0].clone();
    assert_eq!(task.due_time(), utc(2026, 3, 2, 10, 0));

    let submission = SubmissionService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&photos),
        Arc::clone(&clock),
        (&config).into(),
    );
    let inspector = UserId::new();
    let receipt = submission
        .submit(SubmissionRequest {
            task_id: task.id(),
            inspector_id: inspector,
            items: vec![AnswerItem {
                item_key: "extinguisher_sealed".to_owned(),
                item_name: "Extinguisher sealed".to_owned(),
                input_type: "radio".to_owned(),
                value: Some("yes".to_owned()),
            }],
            photos: vec![PhotoUpload {
                bytes: b"front-door-jpeg".to_vec(),
                original_name: Some("front.jpg".to_owned()),
                taken_at: clock.utc(),
                watermark: None,
            }],
            gps: None,
            device_info: Some("tablet-3".to_owned()),
        })
        .await
        .expect("submission accepted");
    assert_eq!(receipt.compliance, ComplianceStatus::OnTime);

    let completed = TaskRepository::find_by_id(&*store, task.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(completed.status(), TaskStatus::Completed);

    // An administrator approves the record; a second decision is a no-op.
    let review = ReviewService::new(Arc::clone(&store), Arc::clone(&clock));
    let outcome = review
        .review(
            receipt.record_id,
            ReviewDecision::Approved,
            UserId::new(),
            None,
        )
        .await
        .expect("review succeeds");
    assert_eq!(outcome, ReviewOutcome::Applied);
    let repeat = review
        .review(
            receipt.record_id,
            ReviewDecision::Punished,
            UserId::new(),
            None,
        )
        .await
        .expect("second review returns the settled state");
    assert_eq!(
        repeat,
        ReviewOutcome::AlreadyReviewed(ReviewStatus::Approved)
    );

    // Four days on, retention removes the completed task, its record, and
    // the stored photo file.
    clock.set(utc(2026, 3, 6, 10, 5));
    let maintenance = TaskMaintenanceService::new(Arc::clone(&store), Arc::clone(&photos));
    let cutoff = clock.utc() - Duration::days(i64::from(config.retention_days));
    let manifest = maintenance
        .delete_completed_before(cutoff)
        .await
        .expect("cleanup succeeds");
    assert_eq!(manifest.tasks, 1);
    assert_eq!(manifest.records, 1);
    assert_eq!(manifest.photos, 1);

    assert!(
        RecordRepository::find_by_id(&*store, receipt.record_id)
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    assert_eq!(photos.stored_count().expect("count"), 0);
}
