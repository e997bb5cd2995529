//! Generative image adapter backed by the OpenAI Images API.
//!
//! Sends a `POST /images/generations` request and maps the first returned
//! image into an [`ArtifactResult`]. Configuration-gated on
//! `OPENAI_API_KEY`; see [`crate::registry`].

use async_trait::async_trait;
use serde::Deserialize;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult, Attribution};

use crate::adapter::{ImageProvider, ProviderError, ProviderKind};

/// Default OpenAI API base URL.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
/// Image model used for worksheet illustrations.
const IMAGE_MODEL: &str = "dall-e-3";
/// Requested image dimensions.
const IMAGE_SIZE: &str = "1024x1024";

/// Adapter for the OpenAI image-generation endpoint.
pub struct OpenAiImages {
    client: reqwest::Client,
    api_key: String,
    api_url: String,
}

/// Response from `POST /images/generations`.
#[derive(Debug, Deserialize)]
pub struct GenerationsResponse {
    #[serde(default)]
    pub data: Vec<GeneratedImage>,
}

/// One generated image entry.
#[derive(Debug, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
}

impl OpenAiImages {
    /// Create an adapter using the public OpenAI endpoint.
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

    /// Map a generations response into the common artifact shape.
    ///
    /// An empty `data` array or a missing URL maps to `NotFound`: the
    /// service answered, it just produced nothing usable.
    fn map_response(response: GenerationsResponse) -> Result<ArtifactResult, ProviderError> {
        let url = response
            .data
            .into_iter()
            .next()
            .and_then(|image| image.url)
            .ok_or(ProviderError::NotFound)?;

        Ok(ArtifactResult {
            url,
            attribution: Attribution {
                provider: "OpenAI".to_string(),
                author: None,
                license: Some("generated".to_string()),
                source_url: None,
            },
            resolved_by: PROVIDER_NAME.to_string(),
        })
    }
}

/// Identifying name for this adapter.
pub const PROVIDER_NAME: &str = "openai-images";

#[async_trait]
impl ImageProvider for OpenAiImages {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Generative
    }

    async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError> {
        let body = serde_json::json!({
            "model": IMAGE_MODEL,
            "prompt": request.query,
            "n": 1,
            "size": IMAGE_SIZE,
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!("HTTP {status}")));
        }

        let parsed: GenerationsResponse = response
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
    fn maps_first_image_url() {
        let response: GenerationsResponse = serde_json::from_value(serde_json::json!({
            "created": 1700000000,
            "data": [{ "url": "https://images.example/gen-1.png", "revised_prompt": "a leaf" }]
        }))
        .unwrap();

        let result = OpenAiImages::map_response(response).unwrap();
        assert_eq!(result.url, "https://images.example/gen-1.png");
        assert_eq!(result.resolved_by, PROVIDER_NAME);
        assert_eq!(result.attribution.provider, "OpenAI");
        assert_eq!(result.attribution.license.as_deref(), Some("generated"));
    }

    #[test]
    fn empty_data_maps_to_not_found() {
        let response: GenerationsResponse =
            serde_json::from_value(serde_json::json!({ "data": [] })).unwrap();
        assert_matches!(
            OpenAiImages::map_response(response),
            Err(ProviderError::NotFound)
        );
    }

    #[test]
    fn missing_url_maps_to_not_found() {
        let response: GenerationsResponse = serde_json::from_value(serde_json::json!({
            "data": [{ "b64_json": "..." }]
        }))
        .unwrap();
        assert_matches!(
            OpenAiImages::map_response(response),
            Err(ProviderError::NotFound)
        );
    }
}
