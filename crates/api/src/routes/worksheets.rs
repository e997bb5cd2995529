//! Route definitions for the `/worksheets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{progress, worksheets};
use crate::state::AppState;

/// Routes mounted at `/worksheets`.
///
/// ```text
/// POST   /                -> submit_worksheet
/// GET    /progress        -> progress_stream (SSE)
/// GET    /{id}            -> get_worksheet
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(worksheets::submit_worksheet))
        .route("/progress", get(progress::progress_stream))
        .route("/{id}", get(worksheets::get_worksheet))
}
