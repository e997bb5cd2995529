use std::sync::Arc;

use sheetforge_engine::{JobRunner, JobStore, ProgressNotifier};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Process-wide job table.
    pub store: Arc<JobStore>,
    /// Executes generation jobs detached from the request path.
    pub runner: Arc<JobRunner>,
    /// Hands out progress subscriptions over the store.
    pub notifier: Arc<ProgressNotifier>,
}
