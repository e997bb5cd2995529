//! Environment-driven provider registry.
//!
//! Builds the eligible provider set at startup. A missing credential only
//! disables the affected adapter; the process always starts. Keyless
//! providers (Openverse, Wikimedia Commons) are on by default and can be
//! turned off with explicit `*_DISABLED` flags.

use std::sync::Arc;
use std::time::Duration;

use crate::adapter::ImageProvider;
use crate::openai::OpenAiImages;
use crate::openverse::Openverse;
use crate::pexels::Pexels;
use crate::resolver::{FallbackResolver, DEFAULT_CALL_TIMEOUT};
use crate::wikimedia::Wikimedia;

/// Read a non-empty environment variable.
fn env_key(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Whether a `*_DISABLED` flag is set to a truthy value.
fn env_disabled(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("1") | Some("true") | Some("yes")
    )
}

/// Build the eligible provider chain from the environment.
///
/// Search providers are returned in quality order (Pexels, Openverse,
/// Wikimedia Commons); the resolver decides where generative providers
/// slot in per request.
///
/// | Env Var              | Effect                                    |
/// |----------------------|-------------------------------------------|
/// | `OPENAI_API_KEY`     | enables the generative adapter            |
/// | `PEXELS_API_KEY`     | enables the Pexels search adapter         |
/// | `OPENVERSE_DISABLED` | disables the keyless Openverse adapter    |
/// | `WIKIMEDIA_DISABLED` | disables the keyless Commons adapter      |
pub fn providers_from_env() -> Vec<Arc<dyn ImageProvider>> {
    let mut providers: Vec<Arc<dyn ImageProvider>> = Vec::new();

    match env_key("OPENAI_API_KEY") {
        Some(key) => providers.push(Arc::new(OpenAiImages::new(key))),
        None => tracing::info!("OPENAI_API_KEY not set; generative image adapter disabled"),
    }

    match env_key("PEXELS_API_KEY") {
        Some(key) => providers.push(Arc::new(Pexels::new(key))),
        None => tracing::info!("PEXELS_API_KEY not set; Pexels adapter disabled"),
    }

    if env_disabled("OPENVERSE_DISABLED") {
        tracing::info!("Openverse adapter disabled by configuration");
    } else {
        providers.push(Arc::new(Openverse::new()));
    }

    if env_disabled("WIKIMEDIA_DISABLED") {
        tracing::info!("Wikimedia Commons adapter disabled by configuration");
    } else {
        providers.push(Arc::new(Wikimedia::new()));
    }

    tracing::info!(
        count = providers.len(),
        "Image provider chain configured",
    );
    providers
}

/// Per-provider call timeout from `PROVIDER_TIMEOUT_SECS` (default 10).
pub fn call_timeout_from_env() -> Duration {
    std::env::var("PROVIDER_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CALL_TIMEOUT)
}

/// Build the fallback resolver from the environment.
pub fn resolver_from_env() -> FallbackResolver {
    FallbackResolver::new(providers_from_env(), call_timeout_from_env())
}
