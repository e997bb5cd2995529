//! Fallback resolution over an ordered provider chain.
//!
//! Given one [`ArtifactRequest`], [`FallbackResolver`] tries each eligible
//! provider in priority order until one yields a result. `NotFound` and
//! `Unavailable` outcomes both advance the chain; exhausting it returns
//! [`ResolverError::Exhausted`] carrying per-provider diagnostics.

use std::sync::Arc;
use std::time::Duration;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult};

use crate::adapter::{ImageProvider, ProviderError, ProviderKind};

/// Default per-provider call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one attempted provider, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub provider: &'static str,
    pub outcome: String,
}

/// Errors from the fallback resolver.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// Every eligible provider was tried without success.
    #[error("all providers exhausted for '{query}' ({} attempted)", attempts.len())]
    Exhausted {
        query: String,
        attempts: Vec<Attempt>,
    },
}

/// Tries providers in priority order until one yields a result.
///
/// The resolver performs no caching and no deduplication: every request is
/// resolved independently, even when queries repeat within a job. Provider
/// calls are bounded by `call_timeout`; a timeout counts as the provider
/// being unavailable.
pub struct FallbackResolver {
    providers: Vec<Arc<dyn ImageProvider>>,
    call_timeout: Duration,
}

impl FallbackResolver {
    /// Create a resolver over the given providers.
    ///
    /// Search providers must be supplied in quality order; the per-request
    /// preference flag decides where generative providers slot in.
    pub fn new(providers: Vec<Arc<dyn ImageProvider>>, call_timeout: Duration) -> Self {
        Self {
            providers,
            call_timeout,
        }
    }

    /// Number of providers in the chain.
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Priority order for one request: generative providers lead when the
    /// request prefers generation, otherwise they trail the search chain as
    /// a last resort.
    fn ordered_for(&self, request: &ArtifactRequest) -> Vec<&Arc<dyn ImageProvider>> {
        let (generative, search): (Vec<_>, Vec<_>) = self
            .providers
            .iter()
            .partition(|p| p.kind() == ProviderKind::Generative);

        if request.prefer_generative {
            generative.into_iter().chain(search).collect()
        } else {
            search.into_iter().chain(generative).collect()
        }
    }

    /// Resolve one artifact request. First success wins; later providers
    /// are never invoked once one has succeeded.
    pub async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ResolverError> {
        let mut attempts = Vec::new();

        for provider in self.ordered_for(request) {
            let name = provider.name();
            match tokio::time::timeout(self.call_timeout, provider.resolve(request)).await {
                Ok(Ok(result)) => {
                    tracing::debug!(
                        provider = name,
                        query = %request.query,
                        "Artifact resolved",
                    );
                    return Ok(result);
                }
                Ok(Err(ProviderError::NotFound)) => {
                    tracing::debug!(provider = name, query = %request.query, "No result");
                    attempts.push(Attempt {
                        provider: name,
                        outcome: "not found".to_string(),
                    });
                }
                Ok(Err(ProviderError::Unavailable(reason))) => {
                    tracing::warn!(
                        provider = name,
                        reason = %reason,
                        "Provider unavailable, trying next",
                    );
                    attempts.push(Attempt {
                        provider: name,
                        outcome: format!("unavailable: {reason}"),
                    });
                }
                Err(_) => {
                    tracing::warn!(
                        provider = name,
                        timeout_ms = self.call_timeout.as_millis() as u64,
                        "Provider timed out, trying next",
                    );
                    attempts.push(Attempt {
                        provider: name,
                        outcome: "unavailable: timed out".to_string(),
                    });
                }
            }
        }

        Err(ResolverError::Exhausted {
            query: request.query.clone(),
            attempts,
        })
    }
}
