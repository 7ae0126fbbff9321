//! Domain tests for task lifecycle, windows, and status projection.

use super::support::{FixedClock, hourly_schedule, task_due_at, utc};
use crate::inspection::domain::{ComplianceStatus, TaskStatus};
use chrono::Duration;
use rstest::rstest;

#[rstest]
fn generated_task_derives_window_from_half_width() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let due = utc(2026, 3, 2, 10, 0, 0);

    let task = task_due_at(&schedule, due, &clock);

    assert_eq!(task.window_start(), utc(2026, 3, 2, 9, 30, 0));
    assert_eq!(task.window_end(), utc(2026, 3, 2, 10, 30, 0));
    assert_eq!(task.status(), TaskStatus::Pending);
    assert_eq!(task.completed_at(), None);
}

#[rstest]
fn submission_at_window_end_is_on_time_one_second_later_rejected() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let task = task_due_at(&schedule, utc(2026, 3, 2, 10, 0, 0), &clock);

    let at_boundary = task.window_end();
    assert_eq!(
        task.classify_submission(at_boundary),
        Some(ComplianceStatus::OnTime)
    );
    assert_eq!(
        task.classify_submission(at_boundary + Duration::seconds(1)),
        None
    );
}

#[rstest]
fn early_submission_is_recorded_as_anomaly() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let task = task_due_at(&schedule, utc(2026, 3, 2, 10, 0, 0), &clock);

    let before_window = task.window_start() - Duration::minutes(5);
    assert_eq!(
        task.classify_submission(before_window),
        Some(ComplianceStatus::Anomaly)
    );
}

#[rstest]
fn zero_half_width_accepts_only_the_exact_due_instant() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 0);
    let due = utc(2026, 3, 2, 10, 0, 0);
    let task = task_due_at(&schedule, due, &clock);

    assert_eq!(task.classify_submission(due), Some(ComplianceStatus::OnTime));
    assert_eq!(
        task.classify_submission(due - Duration::seconds(1)),
        Some(ComplianceStatus::Anomaly)
    );
    assert_eq!(task.classify_submission(due + Duration::seconds(1)), None);
}

#[rstest]
fn pending_task_past_its_window_reads_overdue() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let task = task_due_at(&schedule, utc(2026, 3, 2, 10, 0, 0), &clock);

    let inside = utc(2026, 3, 2, 10, 15, 0);
    let after = utc(2026, 3, 2, 11, 0, 0);

    assert_eq!(task.effective_status(inside), TaskStatus::Pending);
    assert!(!task.is_effectively_overdue(inside));
    assert_eq!(task.effective_status(after), TaskStatus::Overdue);
    assert!(task.is_effectively_overdue(after));
    assert_eq!(task.status(), TaskStatus::Pending);
}

#[rstest]
fn completed_task_never_reads_overdue() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let mut task = task_due_at(&schedule, utc(2026, 3, 2, 10, 0, 0), &clock);

    task.mark_completed(utc(2026, 3, 2, 10, 5, 0));

    let long_after = utc(2026, 3, 3, 0, 0, 0);
    assert_eq!(task.effective_status(long_after), TaskStatus::Completed);
    assert_eq!(task.completed_at(), Some(utc(2026, 3, 2, 10, 5, 0)));
}

#[rstest]
fn availability_requires_due_and_open_window() {
    let clock = FixedClock::at(utc(2026, 3, 2, 8, 0, 0));
    let schedule = hourly_schedule(&clock, 30);
    let task = task_due_at(&schedule, utc(2026, 3, 2, 10, 0, 0), &clock);

    // Window open but not yet due: not in the work queue.
    assert!(!task.is_available(utc(2026, 3, 2, 9, 45, 0)));
    assert!(task.is_available(utc(2026, 3, 2, 10, 0, 0)));
    assert!(task.is_available(task.window_end()));
    assert!(!task.is_available(task.window_end() + Duration::seconds(1)));
}

#[rstest]
#[case("pending", TaskStatus::Pending)]
#[case("COMPLETED", TaskStatus::Completed)]
#[case("  overdue ", TaskStatus::Overdue)]
fn task_status_parses_stored_values(#[case] stored: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(stored).expect("valid status"), expected);
}

#[rstest]
fn task_status_rejects_unknown_values() {
    assert!(TaskStatus::try_from("cancelled").is_err());
}
