//! Background lifecycle jobs: overdue sweeping and retention cleanup.
//!
//! Both jobs run on a fixed cadence, take their first tick immediately at
//! spawn, and stop when the shared cancellation token fires. A failed tick
//! is logged and the loop continues.

use super::maintenance::TaskMaintenanceService;
use crate::inspection::ports::{PhotoStore, TaskRepository};
use chrono::Duration as ChronoDuration;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Spawns the overdue sweep, bulk-transitioning pending tasks past their
/// window to overdue every `interval`.
///
/// The sweep is idempotent, so the cadence only bounds how stale the stored
/// status can get; reads project the effective status regardless.
#[must_use]
pub fn spawn_overdue_sweep<T, C>(
    tasks: Arc<T>,
    clock: Arc<C>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    T: TaskRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("overdue sweep shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    match tasks.mark_overdue(clock.utc()).await {
                        Ok(0) => {}
                        Ok(transitioned) => {
                            info!(transitioned, "marked expired tasks overdue");
                        }
                        Err(err) => error!(error = %err, "overdue sweep failed"),
                    }
                }
            }
        }
    })
}

/// Spawns the retention cleanup, deleting completed tasks older than
/// `retention_days` past completion every `interval`, photo files included.
///
/// A database failure aborts only that tick; photo-file failures are
/// already swallowed inside the maintenance service.
#[must_use]
pub fn spawn_retention_cleanup<T, P, C>(
    maintenance: TaskMaintenanceService<T, P>,
    clock: Arc<C>,
    retention_days: u32,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    T: TaskRepository + 'static,
    P: PhotoStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("retention cleanup shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let cutoff = clock.utc() - ChronoDuration::days(i64::from(retention_days));
                    if let Err(err) = maintenance.delete_completed_before(cutoff).await {
                        error!(error = %err, "retention cleanup failed");
                    }
                }
            }
        }
    })
}
