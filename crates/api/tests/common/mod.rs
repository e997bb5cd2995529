use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use sheetforge_api::config::ServerConfig;
use sheetforge_api::router::build_app_router;
use sheetforge_api::state::AppState;
use sheetforge_core::content::{ContentGenerator, GeneratorError};
use sheetforge_core::worksheet::{
    SectionPlan, WorksheetItem, WorksheetOutline, WorksheetRequest,
};
use sheetforge_engine::{JobRunner, JobStore, ProgressNotifier, RunnerConfig};
use sheetforge_providers::FallbackResolver;

/// Single-section generator used by the HTTP tests.
pub struct StubGenerator;

#[async_trait]
impl ContentGenerator for StubGenerator {
    async fn outline(
        &self,
        request: &WorksheetRequest,
    ) -> Result<WorksheetOutline, GeneratorError> {
        Ok(WorksheetOutline {
            title: format!("{} practice", request.topic),
            sections: vec![SectionPlan {
                heading: "Warm-up".to_string(),
                item_count: 1,
                illustrate: false,
            }],
        })
    }

    async fn compose(
        &self,
        _request: &WorksheetRequest,
        _outline: &WorksheetOutline,
    ) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError> {
        Ok(vec![vec![WorksheetItem {
            prompt: "2 + 2 = ?".to_string(),
            answer: Some("4".to_string()),
            illustration_query: None,
            illustration: None,
        }]])
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        job_retention_minutes: 60,
        progress_poll_interval: Duration::from_millis(10),
    }
}

/// Build application state backed by a stub generator and an empty
/// provider chain (no network calls are possible from tests).
pub fn test_state() -> AppState {
    let config = test_config();
    let store = Arc::new(JobStore::new());
    let resolver = Arc::new(FallbackResolver::new(Vec::new(), Duration::from_millis(50)));
    let runner = Arc::new(JobRunner::new(
        Arc::clone(&store),
        resolver,
        Arc::new(StubGenerator),
        RunnerConfig::default(),
    ));
    let notifier = Arc::new(ProgressNotifier::with_interval(
        Arc::clone(&store),
        config.progress_poll_interval,
    ));

    AppState {
        config: Arc::new(config),
        store,
        runner,
        notifier,
    }
}

/// Build the application router over test state.
///
/// Uses [`build_app_router`], so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app() -> (Router, AppState) {
    let state = test_state();
    let config = Arc::clone(&state.config);
    let app = build_app_router(state.clone(), &config);
    (app, state)
}

/// Issue a GET request against the app.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Issue a POST request with a JSON body against the app.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body into a UTF-8 string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
