use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheetforge_api::background;
use sheetforge_api::config::ServerConfig;
use sheetforge_api::router::build_app_router;
use sheetforge_api::state::AppState;
use sheetforge_engine::{JobRunner, JobStore, ProgressNotifier, RunnerConfig};
use sheetforge_providers::content::OpenAiContentGenerator;
use sheetforge_providers::registry;
use sheetforge_providers::FallbackResolver;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Image providers and fallback resolver ---
    // Eligibility is decided here, once: adapters without credentials are
    // left out of the chain and the process starts regardless.
    let resolver = Arc::new(FallbackResolver::new(
        registry::providers_from_env(),
        registry::call_timeout_from_env(),
    ));

    // --- Content generator ---
    let generator = Arc::new(OpenAiContentGenerator::from_env());

    // --- Job engine ---
    let store = Arc::new(JobStore::new());
    let runner = Arc::new(JobRunner::new(
        Arc::clone(&store),
        Arc::clone(&resolver),
        generator,
        RunnerConfig::from_env(),
    ));
    let notifier = Arc::new(ProgressNotifier::with_interval(
        Arc::clone(&store),
        config.progress_poll_interval,
    ));
    tracing::info!("Job engine initialized");

    // --- Job retention sweeper ---
    let retention_cancel = tokio_util::sync::CancellationToken::new();
    let retention_handle = tokio::spawn(background::job_retention::run(
        Arc::clone(&store),
        config.job_retention_minutes,
        retention_cancel.clone(),
    ));

    // --- App state and router ---
    let state = AppState {
        config: Arc::new(config.clone()),
        store,
        runner,
        notifier,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Job retention task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
