//! Search adapter for the Openverse openly-licensed media API.
//!
//! Openverse aggregates community-uploaded, openly-licensed images and
//! requires no credential for anonymous search. The adapter can be turned
//! off with `OPENVERSE_DISABLED`; see [`crate::registry`].

use async_trait::async_trait;
use serde::Deserialize;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult, Attribution};

use crate::adapter::{ImageProvider, ProviderError, ProviderKind};

/// Default Openverse API base URL.
const DEFAULT_API_URL: &str = "https://api.openverse.org";

/// Identifying name for this adapter.
pub const PROVIDER_NAME: &str = "openverse";

/// Adapter for the Openverse image search API.
pub struct Openverse {
    client: reqwest::Client,
    api_url: String,
}

/// Response from `GET /v1/images/`.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<ImageEntry>,
}

/// One image entry in a search response.
#[derive(Debug, Deserialize)]
pub struct ImageEntry {
    pub url: Option<String>,
    pub creator: Option<String>,
    pub license: Option<String>,
    pub license_version: Option<String>,
    pub foreign_landing_url: Option<String>,
}

impl Openverse {
    /// Create an adapter using the public Openverse endpoint.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL.to_string())
    }

    /// Create an adapter against a custom base URL (used by tests).
    pub fn with_base_url(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }

    /// Map a search response into the common artifact shape.
    ///
    /// Openverse license fields are short codes (`"by-sa"`) plus a version;
    /// they are joined into the familiar `"CC BY-SA 4.0"` form.
    fn map_response(response: SearchResponse) -> Result<ArtifactResult, ProviderError> {
        let entry = response.results.into_iter().next().ok_or(ProviderError::NotFound)?;
        let url = entry.url.ok_or(ProviderError::NotFound)?;

        let license = entry.license.map(|code| {
            let name = format!("CC {}", code.to_uppercase());
            match entry.license_version {
                Some(version) => format!("{name} {version}"),
                None => name,
            }
        });

        Ok(ArtifactResult {
            url,
            attribution: Attribution {
                provider: "Openverse".to_string(),
                author: entry.creator,
                license,
                source_url: entry.foreign_landing_url,
            },
            resolved_by: PROVIDER_NAME.to_string(),
        })
    }
}

impl Default for Openverse {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProvider for Openverse {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError> {
        let response = self
            .client
            .get(format!("{}/v1/images/", self.api_url))
            .query(&[("q", request.query.as_str()), ("page_size", "1")])
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

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn maps_first_result_with_cc_license() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "result_count": 2041,
            "results": [{
                "id": "4bc43a04",
                "url": "https://live.example.org/leaf.jpg",
                "creator": "jsmith",
                "license": "by-sa",
                "license_version": "4.0",
                "foreign_landing_url": "https://www.flickr.com/photos/jsmith/4bc43a04"
            }]
        }))
        .unwrap();

        let result = Openverse::map_response(response).unwrap();
        assert_eq!(result.url, "https://live.example.org/leaf.jpg");
        assert_eq!(result.attribution.license.as_deref(), Some("CC BY-SA 4.0"));
        assert_eq!(result.attribution.author.as_deref(), Some("jsmith"));
        assert_eq!(result.resolved_by, PROVIDER_NAME);
    }

    #[test]
    fn license_without_version_keeps_short_form() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [{ "url": "https://live.example.org/a.jpg", "license": "cc0" }]
        }))
        .unwrap();

        let result = Openverse::map_response(response).unwrap();
        assert_eq!(result.attribution.license.as_deref(), Some("CC CC0"));
    }

    #[test]
    fn empty_results_maps_to_not_found() {
        let response: SearchResponse =
            serde_json::from_value(serde_json::json!({ "results": [] })).unwrap();
        assert_matches!(Openverse::map_response(response), Err(ProviderError::NotFound));
    }

    #[test]
    fn result_without_url_maps_to_not_found() {
        let response: SearchResponse = serde_json::from_value(serde_json::json!({
            "results": [{ "creator": "jsmith" }]
        }))
        .unwrap();
        assert_matches!(Openverse::map_response(response), Err(ProviderError::NotFound));
    }
}
