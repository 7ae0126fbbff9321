//! Service tests for task listings, grouped rollups, and stats.

use super::support::{FixedClock, date, time, utc};
use crate::inspection::{
    adapters::memory::{InMemoryInspectionStore, StaticCheckpointDirectory},
    domain::{
        AreaId, CheckpointId, ComplianceStatus, DailyWindow, InspectionRecord, Schedule, Task,
        TaskId, TaskStatus, UserId, WeekdaySet,
    },
    ports::{
        AreaInfo, CheckpointInfo, PageRequest, RecordRepository, TaskFilter, TaskRepository,
    },
    services::TaskQueryService,
};
use mockable::Clock;
use rstest::{fixture, rstest};
use std::sync::Arc;

type TestQueries =
    TaskQueryService<InMemoryInspectionStore, StaticCheckpointDirectory, FixedClock>;

struct Harness {
    store: Arc<InMemoryInspectionStore>,
    clock: Arc<FixedClock>,
    checkpoint_id: CheckpointId,
}

#[fixture]
fn harness() -> Harness {
    Harness {
        store: Arc::new(InMemoryInspectionStore::new()),
        clock: Arc::new(FixedClock::at(utc(2026, 3, 2, 8, 0, 0))),
        checkpoint_id: CheckpointId::new(),
    }
}

fn queries(harness: &Harness, directory: StaticCheckpointDirectory) -> TestQueries {
    TaskQueryService::new(
        Arc::clone(&harness.store),
        Arc::new(directory),
        Arc::clone(&harness.clock),
    )
}

fn schedule_for(harness: &Harness) -> Schedule {
    Schedule::new(
        harness.checkpoint_id,
        60,
        DailyWindow::new(time(9, 0), time(17, 0)).expect("valid window"),
        WeekdaySet::full(),
        30,
        &*harness.clock,
    )
    .expect("valid schedule")
}

async fn seed_task(harness: &Harness, schedule: &Schedule, hour: u32) -> TaskId {
    let task = Task::generated(schedule, utc(2026, 3, 2, hour, 0, 0), &*harness.clock);
    harness
        .store
        .insert_batch(std::slice::from_ref(&task))
        .await
        .expect("insert succeeds");
    task.id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn effective_status_is_consistent_before_and_after_the_sweep(harness: Harness) {
    let schedule = schedule_for(&harness);
    let expired = seed_task(&harness, &schedule, 9).await;
    let open = seed_task(&harness, &schedule, 12).await;

    // Noon: the 09:00 task's window closed at 09:30, the sweep has not run.
    harness.clock.set(utc(2026, 3, 2, 12, 0, 0));
    let service = queries(&harness, StaticCheckpointDirectory::default());

    let before = service.get_task(expired).await.expect("lookup succeeds");
    assert_eq!(before.expect("task exists").status, TaskStatus::Overdue);

    let swept = harness
        .store
        .mark_overdue(harness.clock.utc())
        .await
        .expect("sweep succeeds");
    assert_eq!(swept, 1);

    let after = service.get_task(expired).await.expect("lookup succeeds");
    assert_eq!(after.expect("task exists").status, TaskStatus::Overdue);

    let still_open = service.get_task(open).await.expect("lookup succeeds");
    assert_eq!(still_open.expect("task exists").status, TaskStatus::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn available_listing_serves_only_due_open_tasks(harness: Harness) {
    let schedule = schedule_for(&harness);
    seed_task(&harness, &schedule, 9).await;
    let due_now = seed_task(&harness, &schedule, 12).await;
    seed_task(&harness, &schedule, 15).await;

    harness.clock.set(utc(2026, 3, 2, 12, 10, 0));
    let service = queries(&harness, StaticCheckpointDirectory::default());

    let page = service
        .list_available(PageRequest::default())
        .await
        .expect("listing succeeds");

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, due_now);
    assert_eq!(page.items[0].status, TaskStatus::Pending);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_listing_filters_by_effective_status(harness: Harness) {
    let schedule = schedule_for(&harness);
    seed_task(&harness, &schedule, 9).await;
    seed_task(&harness, &schedule, 12).await;

    harness.clock.set(utc(2026, 3, 2, 12, 0, 0));
    let service = queries(&harness, StaticCheckpointDirectory::default());

    let overdue_filter = TaskFilter {
        due_on: Some(date(2026, 3, 2)),
        effective_status: Some(TaskStatus::Overdue),
        checkpoint_id: Some(harness.checkpoint_id),
    };
    let page = service
        .list_tasks(&overdue_filter, PageRequest::default())
        .await
        .expect("listing succeeds");

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].due_time, utc(2026, 3, 2, 9, 0, 0));
    assert_eq!(page.items[0].status, TaskStatus::Overdue);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pagination_reports_full_total(harness: Harness) {
    let schedule = schedule_for(&harness);
    for hour in 9..=13 {
        seed_task(&harness, &schedule, hour).await;
    }
    let service = queries(&harness, StaticCheckpointDirectory::default());

    let page = service
        .list_tasks(&TaskFilter::default(), PageRequest::new(2, 2))
        .await
        .expect("listing succeeds");

    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn grouped_rollups_resolve_names_and_balance_counts(harness: Harness) {
    let schedule = schedule_for(&harness);
    seed_task(&harness, &schedule, 9).await;
    seed_task(&harness, &schedule, 12).await;
    let completed = seed_task(&harness, &schedule, 10).await;
    let record = InspectionRecord::submitted(
        completed,
        harness.checkpoint_id,
        UserId::new(),
        ComplianceStatus::OnTime,
        Vec::new(),
        Vec::new(),
        None,
        None,
        utc(2026, 3, 2, 10, 5, 0),
    );
    harness
        .store
        .create_completing(&record)
        .await
        .expect("completion succeeds");

    harness.clock.set(utc(2026, 3, 2, 12, 0, 0));
    let lobby = CheckpointInfo {
        id: harness.checkpoint_id,
        name: "Lobby".to_owned(),
        area: Some(AreaInfo {
            id: AreaId::new(),
            name: "Ground Floor".to_owned(),
            floor: Some("1".to_owned()),
            building: None,
        }),
    };
    let unassigned = CheckpointInfo {
        id: CheckpointId::new(),
        name: "Loading Dock".to_owned(),
        area: None,
    };
    let service = queries(
        &harness,
        StaticCheckpointDirectory::new(vec![lobby, unassigned]),
    );

    let rollups = service.grouped(Some(date(2026, 3, 2))).await.expect("grouping succeeds");

    assert_eq!(rollups.len(), 2);
    let ground = rollups
        .iter()
        .find(|group| group.area.is_some())
        .expect("assigned area present");
    assert_eq!(
        ground.area.as_ref().map(|area| area.name.as_str()),
        Some("Ground Floor")
    );
    let stats = ground.checkpoints[0].stats;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.completed + stats.pending + stats.overdue, stats.total);

    let dock = rollups
        .iter()
        .find(|group| group.area.is_none())
        .expect("unassigned bucket present");
    assert_eq!(dock.checkpoints[0].checkpoint_name, "Loading Dock");
    assert_eq!(dock.checkpoints[0].stats.total, 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_use_effective_status_arithmetic(harness: Harness) {
    let schedule = schedule_for(&harness);
    seed_task(&harness, &schedule, 9).await;
    seed_task(&harness, &schedule, 12).await;

    harness.clock.set(utc(2026, 3, 2, 12, 0, 0));
    let service = queries(&harness, StaticCheckpointDirectory::default());

    let stats = service
        .stats(Some(date(2026, 3, 2)), Some(date(2026, 3, 2)))
        .await
        .expect("stats succeed");

    assert_eq!(stats.total, 2);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completed, 0);
}
