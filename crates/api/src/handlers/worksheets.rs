//! Handlers for the `/worksheets` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use sheetforge_core::types::JobId;
use sheetforge_core::worksheet::{validate_request, WorksheetRequest};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a job submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
}

/// POST /api/v1/worksheets
///
/// Submit a worksheet generation request. Returns 202 with the job id
/// immediately; generation proceeds in the background and progress is
/// observable via the progress stream.
pub async fn submit_worksheet(
    State(state): State<AppState>,
    Json(request): Json<WorksheetRequest>,
) -> AppResult<impl IntoResponse> {
    validate_request(&request)?;

    let job_id = state.runner.start(request).await;

    tracing::info!(job_id = %job_id, "Worksheet job submitted");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse::new(SubmitResponse { job_id })),
    ))
}

/// GET /api/v1/worksheets/{id}
///
/// One-shot snapshot of a job: progress fields plus, once terminal, the
/// assembled document or failure detail. 404 for unknown or evicted ids.
pub async fn get_worksheet(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .store
        .find(&job_id)
        .await
        .ok_or(AppError::UnknownJob(job_id))?;

    Ok(Json(DataResponse::new(record)))
}
