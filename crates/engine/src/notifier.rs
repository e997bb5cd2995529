//! Progress notifier: long-lived push channel over the job store.
//!
//! Each subscription runs its own interval-driven poll task against the
//! [`JobStore`], forwarding a [`ProgressUpdate`] whenever the observed
//! percentage changes, and ending after the terminal record (or an
//! unknown-job condition) has been delivered. Dropping the returned stream
//! cancels the poll task promptly.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

use sheetforge_core::job::ProgressRecord;
use sheetforge_core::types::JobId;

use crate::store::JobStore;

/// Default store polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Buffered updates per subscription before the poller backpressures.
const CHANNEL_CAPACITY: usize = 16;

/// One observed progress change, or the unknown-job end condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressUpdate {
    /// The job's percentage changed (or reached a terminal state).
    Progress(ProgressRecord),
    /// The job id is not present in the store: never started, or already
    /// garbage-collected. Always the final update of its stream.
    UnknownJob,
}

/// Hands out single-use progress subscriptions.
///
/// Subscriptions are independent: two subscribers to the same job each get
/// their own poll task reading the same underlying store state.
pub struct ProgressNotifier {
    store: Arc<JobStore>,
    poll_interval: Duration,
}

impl ProgressNotifier {
    /// Create a notifier with the default poll interval.
    pub fn new(store: Arc<JobStore>) -> Self {
        Self::with_interval(store, DEFAULT_POLL_INTERVAL)
    }

    /// Create a notifier with a custom poll interval.
    pub fn with_interval(store: Arc<JobStore>, poll_interval: Duration) -> Self {
        Self {
            store,
            poll_interval,
        }
    }

    /// Open a progress stream for a job id.
    ///
    /// The stream yields updates until the terminal record or an
    /// unknown-job condition has been delivered, then ends. It is not
    /// restartable; call `subscribe` again for a fresh observation.
    pub fn subscribe(&self, job_id: JobId) -> ProgressStream {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let store = Arc::clone(&self.store);
        let poll_interval = self.poll_interval;
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            poll_loop(store, job_id, poll_interval, tx, task_cancel).await;
        });

        ProgressStream {
            rx,
            _guard: cancel.drop_guard(),
        }
    }
}

/// Poll the store until the subscription ends, emitting only on change.
async fn poll_loop(
    store: Arc<JobStore>,
    job_id: JobId,
    poll_interval: Duration,
    tx: mpsc::Sender<ProgressUpdate>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    let mut last_emitted: Option<u8> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, "Progress subscription dropped");
                break;
            }
            _ = ticker.tick() => {
                let Some(record) = store.get(&job_id).await else {
                    let _ = tx.send(ProgressUpdate::UnknownJob).await;
                    break;
                };

                let terminal = record.is_terminal();
                if terminal || last_emitted != Some(record.percent) {
                    last_emitted = Some(record.percent);
                    if tx.send(ProgressUpdate::Progress(record)).await.is_err() {
                        // Subscriber went away between polls.
                        break;
                    }
                }
                if terminal {
                    break;
                }
            }
        }
    }
}

/// A single-use stream of progress updates for one job.
///
/// Ends after the terminal or unknown-job update. Dropping it cancels the
/// underlying poll task.
pub struct ProgressStream {
    rx: mpsc::Receiver<ProgressUpdate>,
    _guard: DropGuard,
}

impl ProgressStream {
    /// Receive the next update, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<ProgressUpdate> {
        self.rx.recv().await
    }
}

impl futures::Stream for ProgressStream {
    type Item = ProgressUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
