//! Search adapter for the Pexels curated stock-photo API.
//!
//! Sends `GET /v1/search` with the query and maps the first photo into an
//! [`ArtifactResult`]. Configuration-gated on `PEXELS_API_KEY`.

use async_trait::async_trait;
use serde::Deserialize;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult, Attribution};

use crate::adapter::{ImageProvider, ProviderError, ProviderKind};

/// Default Pexels API base URL.
const DEFAULT_API_URL: &str = "https://api.pexels.com";

/// Identifying name for this adapter.
pub const PROVIDER_NAME: &str = "pexels";

/// Adapter for the Pexels photo search API.
pub struct Pexels {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

/// Response from `GET /v1/search`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub photos: Vec<Photo>,
}

/// One photo entry in a search response.
#[derive(Debug, Deserialize)]
pub struct Photo {
    /// Page on pexels.com where the photo lives.
    pub url: Option<String>,
    pub photographer: Option<String>,
    pub src: PhotoSources,
}

/// Pre-rendered size variants for a photo.
#[derive(Debug, Deserialize)]
pub struct PhotoSources {
    pub large: Option<String>,
    pub original: Option<String>,
}

impl Pexels {
    /// Create an adapter using the public Pexels endpoint.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create an adapter against a custom base URL (used by tests).
    pub fn with_base_url(api_key: String, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
        }
    }

    /// Map a search response into the common artifact shape.
    ///
    /// Prefers the `large` rendition, falling back to `original`. An empty
    /// result set maps to `NotFound`.
    fn map_response(response: SearchResponse) -> Result<ArtifactResult, ProviderError> {
        let photo = response.photos.into_iter().next().ok_or(ProviderError::NotFound)?;

        let url = photo
            .src
            .large
            .or(photo.src.original)
            .ok_or(ProviderError::NotFound)?;

        Ok(ArtifactResult {
            url,
            attribution: Attribution {
                provider: "Pexels".to_string(),
                author: photo.photographer,
                license: Some("Pexels License".to_string()),
                source_url: photo.url,
            },
            resolved_by: PROVIDER_NAME.to_string(),
        })
    }
}

#[async_trait]
impl ImageProvider for Pexels {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/search", self.api_url))
            .header("Authorization", &self.api_key)
            .query(&[("query", request.query.as_str()), ("per_page", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!("HTTP {status}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("invalid response: {e}")))?;

        Self::map_response(parsed)
    }
}
