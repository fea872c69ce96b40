//! Overdue sweep background task.
//!
//! Periodically marks tasks past their due date as overdue through the
//! same transactional transition path actors use, so the penalty debit
//! fires exactly once per task.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::task_service::TaskService;

/// Spawn the overdue sweep background task.
///
/// The sweep runs every `interval_seconds`. On each tick it marks every
/// task whose due date has passed and whose status is still pending or
/// in progress.
#[must_use]
pub fn spawn_overdue_sweep(
    service: TaskService,
    interval_seconds: u64,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("overdue sweep shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = service.sweep_overdue(Utc::now()).await {
                        error!(%err, "overdue sweep failed");
                    }
                }
            }
        }
    })
}
