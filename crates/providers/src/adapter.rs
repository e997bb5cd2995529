//! The common capability every image provider adapter implements.

use async_trait::async_trait;
use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult};

/// How a provider produces images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Calls an AI image-generation service.
    Generative,
    /// Searches an existing stock/media catalogue.
    Search,
}

/// Errors a provider adapter can return.
///
/// The resolver needs the distinction: `NotFound` means the provider was
/// reachable but had no usable result; `Unavailable` covers configuration,
/// network, rate-limit, and malformed-response failures. Both advance the
/// fallback chain, but they are logged at different severities.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Provider responded normally but had no usable result.
    #[error("no usable result")]
    NotFound,

    /// Provider could not be used: unreachable, rate-limited, or the
    /// response did not have the expected shape.
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest error text carries no credentials or response bodies.
        ProviderError::Unavailable(err.without_url().to_string())
    }
}

/// One external image source behind a uniform resolve contract.
///
/// Adapters own only the mapping between their provider's native request and
/// response shapes and the common [`ArtifactResult`]. They perform no
/// retries and hold no job state; retries and ordering are the resolver's
/// concern.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Identifying name, recorded on results and in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this provider generates or searches.
    fn kind(&self) -> ProviderKind;

    /// Resolve one artifact request against this provider.
    async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError>;
}
