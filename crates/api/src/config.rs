use std::time::Duration;

/// Floor for the progress poll interval. Guards against a configured value
/// that would turn every subscription into a hot loop on the store.
const MIN_POLL_INTERVAL_MS: u64 = 25;

/// Server configuration loaded from environment variables.
///
/// Defaults suit local development; production overrides each value via
/// the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Bounds the time to
    /// produce a response head, so open SSE streams are not cut off.
    pub request_timeout_secs: u64,
    /// How long terminal jobs stay available for polling before eviction.
    pub job_retention_minutes: i64,
    /// Store polling interval for progress subscriptions. Clamped to at
    /// least [`MIN_POLL_INTERVAL_MS`].
    pub progress_poll_interval: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `JOB_RETENTION_MINUTES`     | `60`                    |
    /// | `PROGRESS_POLL_INTERVAL_MS` | `150`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let job_retention_minutes: i64 = std::env::var("JOB_RETENTION_MINUTES")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("JOB_RETENTION_MINUTES must be a valid i64");

        let poll_ms: u64 = std::env::var("PROGRESS_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| "150".into())
            .parse()
            .expect("PROGRESS_POLL_INTERVAL_MS must be a valid u64");
        if poll_ms < MIN_POLL_INTERVAL_MS {
            tracing::warn!(
                configured_ms = poll_ms,
                floor_ms = MIN_POLL_INTERVAL_MS,
                "PROGRESS_POLL_INTERVAL_MS below floor, clamping"
            );
        }

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            job_retention_minutes,
            progress_poll_interval: Duration::from_millis(poll_ms.max(MIN_POLL_INTERVAL_MS)),
        }
    }
}
