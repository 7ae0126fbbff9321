//! Background job tests for overdue sweeping and retention cleanup.

use super::support::{FixedClock, hourly_schedule, task_due_at, utc};
use crate::inspection::{
    adapters::memory::{InMemoryInspectionStore, InMemoryPhotoStore},
    domain::{
        ComplianceStatus, InspectionRecord, RecordPhoto, Task, TaskStatus, UserId,
    },
    ports::{PhotoStore, TaskRepository},
    services::{TaskMaintenanceService, spawn_overdue_sweep, spawn_retention_cleanup},
};
use chrono::Duration as ChronoDuration;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

async fn seed_pending(store: &InMemoryInspectionStore, clock: &FixedClock, hour: u32) -> Task {
    let schedule = hourly_schedule(clock, 30);
    let task = task_due_at(&schedule, utc(2026, 3, 2, hour, 0, 0), clock);
    store
        .insert_batch(std::slice::from_ref(&task))
        .await
        .expect("insert succeeds");
    task
}

#[tokio::test(start_paused = true)]
async fn overdue_sweep_runs_immediately_and_then_on_cadence() {
    let store = Arc::new(InMemoryInspectionStore::new());
    let clock = Arc::new(FixedClock::at(utc(2026, 3, 2, 8, 0, 0)));
    let expired = seed_pending(&store, &clock, 9).await;

    // The 09:00 task's window closed at 09:30.
    clock.set(utc(2026, 3, 2, 12, 0, 0));

    let cancel = CancellationToken::new();
    let handle = spawn_overdue_sweep(
        Arc::clone(&store),
        Arc::clone(&clock),
        Duration::from_secs(300),
        cancel.clone(),
    );

    // First tick fires at spawn.
    tokio::time::sleep(Duration::from_millis(10)).await;
    let swept = store
        .find_by_id(expired.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(swept.status(), TaskStatus::Overdue);

    // A task expiring later is picked up by a subsequent tick.
    let next = seed_pending(&store, &clock, 11).await;
    clock.set(utc(2026, 3, 2, 13, 0, 0));
    tokio::time::sleep(Duration::from_secs(301)).await;
    let swept = store
        .find_by_id(next.id())
        .await
        .expect("lookup succeeds")
        .expect("task exists");
    assert_eq!(swept.status(), TaskStatus::Overdue);

    cancel.cancel();
    handle.await.expect("sweep task joins");
}

#[tokio::test(start_paused = true)]
async fn retention_cleanup_removes_expired_tasks_and_their_photo_files() {
    let store = Arc::new(InMemoryInspectionStore::new());
    let photos = Arc::new(InMemoryPhotoStore::new());
    let clock = Arc::new(FixedClock::at(utc(2026, 3, 2, 8, 0, 0)));

    let task = seed_pending(&store, &clock, 10).await;
    let stored_photo = photos.store(b"jpeg-bytes").await.expect("photo stored");
    let handle = stored_photo.handle.clone();
    let record = InspectionRecord::submitted(
        task.id(),
        task.checkpoint_id(),
        UserId::new(),
        ComplianceStatus::OnTime,
        Vec::new(),
        vec![RecordPhoto {
            handle: handle.clone(),
            original_name: None,
            size_bytes: stored_photo.size_bytes,
            content_hash: stored_photo.content_hash.clone(),
            watermark: None,
            taken_at: utc(2026, 3, 2, 10, 0, 0),
        }],
        None,
        None,
        utc(2026, 3, 2, 10, 0, 0),
    );
    crate::inspection::ports::RecordRepository::create_completing(&*store, &record)
        .await
        .expect("record persisted");

    // Four days later the three-day retention has lapsed.
    clock.set(clock.utc() + ChronoDuration::days(4));

    let cancel = CancellationToken::new();
    let maintenance = TaskMaintenanceService::new(Arc::clone(&store), Arc::clone(&photos));
    let handle_join = spawn_retention_cleanup(
        maintenance,
        Arc::clone(&clock),
        3,
        Duration::from_secs(86_400),
        cancel.clone(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(
        store
            .find_by_id(task.id())
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    assert!(
        crate::inspection::ports::RecordRepository::find_by_id(&*store, record.id())
            .await
            .expect("lookup succeeds")
            .is_none()
    );
    assert!(!photos.contains(&handle).expect("store readable"));

    cancel.cancel();
    handle_join.await.expect("cleanup task joins");
}

#[tokio::test(start_paused = true)]
async fn retention_cleanup_keeps_recent_completed_tasks() {
    let store = Arc::new(InMemoryInspectionStore::new());
    let photos = Arc::new(InMemoryPhotoStore::new());
    let clock = Arc::new(FixedClock::at(utc(2026, 3, 2, 8, 0, 0)));

    let task = seed_pending(&store, &clock, 10).await;
    let record = InspectionRecord::submitted(
        task.id(),
        task.checkpoint_id(),
        UserId::new(),
        ComplianceStatus::OnTime,
        Vec::new(),
        Vec::new(),
        None,
        None,
        utc(2026, 3, 2, 10, 0, 0),
    );
    crate::inspection::ports::RecordRepository::create_completing(&*store, &record)
        .await
        .expect("record persisted");

    // One day later the task is still inside the retention window.
    clock.set(clock.utc() + ChronoDuration::days(1));

    let cancel = CancellationToken::new();
    let maintenance = TaskMaintenanceService::new(Arc::clone(&store), Arc::clone(&photos));
    let handle_join = spawn_retention_cleanup(
        maintenance,
        Arc::clone(&clock),
        3,
        Duration::from_secs(86_400),
        cancel.clone(),
    );

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(
        store
            .find_by_id(task.id())
            .await
            .expect("lookup succeeds")
            .is_some()
    );

    cancel.cancel();
    handle_join.await.expect("cleanup task joins");
}
