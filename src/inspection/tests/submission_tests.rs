//! Service tests for the submission validation pipeline.

use super::support::{FixedClock, time, utc};
use crate::inspection::{
    adapters::memory::{InMemoryInspectionStore, InMemoryPhotoStore},
    domain::{
        AnswerItem, CheckpointId, ComplianceStatus, DailyWindow, Schedule, Task, TaskId,
        TaskStatus, UserId, WeekdaySet,
    },
    ports::TaskRepository,
    services::{
        PhotoUpload, SubmissionError, SubmissionPolicy, SubmissionRequest, SubmissionService,
    },
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestSubmission = SubmissionService<
    InMemoryInspectionStore,
    InMemoryInspectionStore,
    InMemoryPhotoStore,
    FixedClock,
>;

struct Harness {
    store: Arc<InMemoryInspectionStore>,
    photos: Arc<InMemoryPhotoStore>,
    clock: Arc<FixedClock>,
    service: TestSubmission,
    checkpoint_id: CheckpointId,
    schedule: Schedule,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryInspectionStore::new());
    let photos = Arc::new(InMemoryPhotoStore::new());
    let clock = Arc::new(FixedClock::at(utc(2026, 3, 2, 8, 0, 0)));
    let checkpoint_id = CheckpointId::new();
    let schedule = Schedule::new(
        checkpoint_id,
        60,
        DailyWindow::new(time(9, 0), time(17, 0)).expect("valid window"),
        WeekdaySet::full(),
        30,
        &*clock,
    )
    .expect("valid schedule");
    let service = SubmissionService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&photos),
        Arc::clone(&clock),
        SubmissionPolicy {
            cooldown_minutes: 15,
            photo_drift_minutes: 5,
            min_photos: 1,
        },
    );
    Harness {
        store,
        photos,
        clock,
        service,
        checkpoint_id,
        schedule,
    }
}

impl Harness {
    async fn seed_task(&self, hour: u32, minute: u32) -> Task {
        let task = Task::generated(
            &self.schedule,
            utc(2026, 3, 2, hour, minute, 0),
            &*self.clock,
        );
        self.store
            .insert_batch(std::slice::from_ref(&task))
            .await
            .expect("insert succeeds");
        task
    }

    fn request_at(&self, task_id: TaskId, taken_at: DateTime<Utc>) -> SubmissionRequest {
        SubmissionRequest {
            task_id,
            inspector_id: UserId::new(),
            items: vec![AnswerItem {
                item_key: "door_locked".to_owned(),
                item_name: "Door locked".to_owned(),
                input_type: "radio".to_owned(),
                value: Some("yes".to_owned()),
            }],
            photos: vec![PhotoUpload {
                bytes: b"jpeg-bytes-one".to_vec(),
                original_name: Some("front.jpg".to_owned()),
                taken_at,
                watermark: None,
            }],
            gps: None,
            device_info: Some("tablet-7".to_owned()),
        }
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn on_time_submission_completes_the_task(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 10, 0));

    let receipt = harness
        .service
        .submit(harness.request_at(task.id(), harness.clock.utc()))
        .await
        .expect("submission accepted");

    assert_eq!(receipt.compliance, ComplianceStatus::OnTime);
    assert_eq!(receipt.task_id, task.id());

    let stored = harness
        .store
        .find_by_id(task.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::Completed);
    assert_eq!(stored.completed_at(), Some(utc(2026, 3, 2, 10, 10, 0)));
    assert_eq!(harness.photos.stored_count().expect("count"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn window_end_boundary_is_accepted_one_second_later_rejected(harness: Harness) {
    let task = harness.seed_task(10, 0).await;

    harness.clock.set(task.window_end());
    harness
        .service
        .submit(harness.request_at(task.id(), harness.clock.utc()))
        .await
        .expect("boundary submission accepted");

    let late_task = harness.seed_task(11, 0).await;
    harness.clock.set(late_task.window_end() + Duration::seconds(1));
    let result = harness
        .service
        .submit(harness.request_at(late_task.id(), harness.clock.utc()))
        .await;

    assert!(matches!(result, Err(SubmissionError::WindowClosed { .. })));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn early_submission_is_accepted_as_anomaly(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 9, 20, 0));

    let receipt = harness
        .service
        .submit(harness.request_at(task.id(), harness.clock.utc()))
        .await
        .expect("early submission accepted");

    assert_eq!(receipt.compliance, ComplianceStatus::Anomaly);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cooldown_rejects_with_remaining_minutes_then_expires(harness: Harness) {
    let first = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));
    harness
        .service
        .submit(harness.request_at(first.id(), harness.clock.utc()))
        .await
        .expect("first submission accepted");

    // Ten minutes later the same checkpoint is still cooling down.
    let second = harness.seed_task(10, 30).await;
    harness.clock.set(utc(2026, 3, 2, 10, 10, 0));
    let rejected = harness
        .service
        .submit(harness.request_at(second.id(), harness.clock.utc()))
        .await;
    let Err(SubmissionError::CooldownActive { remaining_minutes }) = rejected else {
        panic!("expected cooldown rejection, got {rejected:?}");
    };
    assert_eq!(remaining_minutes, 5);

    // Sixteen minutes after the first submission the cooldown has expired.
    harness.clock.set(utc(2026, 3, 2, 10, 16, 0));
    harness
        .service
        .submit(harness.request_at(second.id(), harness.clock.utc()))
        .await
        .expect("submission after cooldown accepted");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn photo_drift_beyond_the_limit_rejects_the_submission(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));

    let stale_capture = harness.clock.utc() - Duration::minutes(6);
    let result = harness
        .service
        .submit(harness.request_at(task.id(), stale_capture))
        .await;

    assert!(matches!(
        result,
        Err(SubmissionError::PhotoTimeDrift { limit_minutes: 5, .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_photo_content_rejects_the_submission(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));

    let mut request = harness.request_at(task.id(), harness.clock.utc());
    request.photos.push(PhotoUpload {
        bytes: b"jpeg-bytes-one".to_vec(),
        original_name: Some("copy.jpg".to_owned()),
        taken_at: harness.clock.utc(),
        watermark: None,
    });

    let result = harness.service.submit(request).await;

    assert!(matches!(
        result,
        Err(SubmissionError::DuplicatePhoto { .. })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submissions_without_photos_are_rejected(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));

    let mut request = harness.request_at(task.id(), harness.clock.utc());
    request.photos.clear();

    let result = harness.service.submit(request).await;

    assert!(matches!(
        result,
        Err(SubmissionError::NotEnoughPhotos { required: 1 })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn racing_submissions_complete_the_task_exactly_once(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 10, 0));

    let left = {
        let service = harness.service.clone();
        let request = harness.request_at(task.id(), harness.clock.utc());
        tokio::spawn(async move { service.submit(request).await })
    };
    let right = {
        let service = harness.service.clone();
        let request = harness.request_at(task.id(), harness.clock.utc());
        tokio::spawn(async move { service.submit(request).await })
    };

    let outcomes = [
        left.await.expect("task joins"),
        right.await.expect("task joins"),
    ];

    // The pending compare-and-set admits exactly one record; the loser is
    // rejected at whichever check first observes the winner.
    let winners = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(winners, 1);
    for outcome in &outcomes {
        if let Err(err) = outcome {
            assert!(matches!(
                err,
                SubmissionError::CompletionConflict(_)
                    | SubmissionError::TaskNotPending { .. }
                    | SubmissionError::CooldownActive { .. }
            ));
        }
    }

    let stored = harness
        .store
        .find_by_id(task.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(stored.status(), TaskStatus::Completed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn a_completed_task_accepts_no_second_submission(harness: Harness) {
    let task = harness.seed_task(10, 0).await;
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));

    harness
        .service
        .submit(harness.request_at(task.id(), harness.clock.utc()))
        .await
        .expect("first submission accepted");

    harness.clock.set(utc(2026, 3, 2, 10, 20, 0));
    let result = harness
        .service
        .submit(harness.request_at(task.id(), harness.clock.utc()))
        .await;

    assert!(matches!(
        result,
        Err(SubmissionError::TaskNotPending {
            status: TaskStatus::Completed,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn submitting_against_a_missing_task_is_reported(harness: Harness) {
    harness.clock.set(utc(2026, 3, 2, 10, 0, 0));
    let ghost = TaskId::new();

    let result = harness
        .service
        .submit(harness.request_at(ghost, harness.clock.utc()))
        .await;

    assert!(matches!(result, Err(SubmissionError::TaskNotFound(id)) if id == ghost));
}
