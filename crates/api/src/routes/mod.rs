pub mod health;
pub mod worksheets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /worksheets                POST   submit a generation job
/// /worksheets/progress       GET    SSE progress stream (?job_id=...)
/// /worksheets/{id}           GET    one-shot job snapshot
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/worksheets", worksheets::router())
}
