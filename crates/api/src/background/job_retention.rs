//! Periodic eviction of terminal jobs from the job store.
//!
//! Spawns a background task that removes jobs which reached a terminal
//! state longer ago than the configured retention window. Runs on a fixed
//! interval using `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use sheetforge_engine::JobStore;

/// How often the eviction sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the job retention loop.
///
/// Evicts terminal jobs older than `retention_minutes`. Runs until
/// `cancel` is triggered. Running jobs are never evicted.
pub async fn run(store: Arc<JobStore>, retention_minutes: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_minutes,
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Job retention task started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention task stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::minutes(retention_minutes);
                let purged = store.purge_terminal_older_than(cutoff).await;
                if purged > 0 {
                    tracing::info!(purged, "Job retention: evicted terminal jobs");
                } else {
                    tracing::debug!("Job retention: nothing to evict");
                }
            }
        }
    }
}
