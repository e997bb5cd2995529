//! SSE progress stream for job subscriptions.
//!
//! Relays a [`ProgressNotifier`] subscription to the client as discrete
//! server-sent events. The stream ends (and the connection closes) after
//! the terminal or unknown-job event; the poll task behind the
//! subscription is cancelled when the client disconnects.

use std::convert::Infallible;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use sheetforge_core::job::JobState;
use sheetforge_core::job_events::{
    EVENT_JOB_COMPLETED, EVENT_JOB_FAILED, EVENT_JOB_PROGRESS, EVENT_UNKNOWN_JOB,
};
use sheetforge_engine::ProgressUpdate;

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters for the progress stream.
#[derive(Debug, Deserialize)]
pub struct ProgressParams {
    pub job_id: Option<String>,
}

/// Translate one progress update into an SSE event.
fn to_event(update: ProgressUpdate) -> Event {
    match update {
        ProgressUpdate::Progress(record) => {
            let name = match record.state {
                JobState::Succeeded => EVENT_JOB_COMPLETED,
                JobState::Failed => EVENT_JOB_FAILED,
                JobState::Queued | JobState::Running => EVENT_JOB_PROGRESS,
            };
            let payload = serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string());
            Event::default().event(name).data(payload)
        }
        ProgressUpdate::UnknownJob => Event::default().event(EVENT_UNKNOWN_JOB).data("{}"),
    }
}

/// GET /api/v1/worksheets/progress?job_id=...
///
/// Open a progress subscription for a job. Emits one event per observed
/// percentage change; the terminal event (or `unknown_job`) is the last,
/// after which the server closes the stream. A missing `job_id` is a 400
/// before any stream is opened.
pub async fn progress_stream(
    State(state): State<AppState>,
    Query(params): Query<ProgressParams>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let job_id = params
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("job_id query parameter is required".to_string()))?;

    tracing::debug!(job_id = %job_id, "Progress subscription opened");

    let stream = state
        .notifier
        .subscribe(job_id)
        .map(|update| Ok::<Event, Infallible>(to_event(update)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
