//! Search adapter for Wikimedia Commons.
//!
//! Uses the MediaWiki `action=query` API with a file-namespace search
//! generator and `imageinfo` props. Keyless; can be turned off with
//! `WIKIMEDIA_DISABLED`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use sheetforge_core::artifact::{ArtifactRequest, ArtifactResult, Attribution};

use crate::adapter::{ImageProvider, ProviderError, ProviderKind};

/// Default Wikimedia Commons API endpoint.
const DEFAULT_API_URL: &str = "https://commons.wikimedia.org/w/api.php";

/// Identifying name for this adapter.
pub const PROVIDER_NAME: &str = "wikimedia-commons";

/// Adapter for Wikimedia Commons file search.
pub struct Wikimedia {
    client: reqwest::Client,
    api_url: String,
}

/// Top-level response from the MediaWiki query API.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
pub struct QueryBody {
    /// Keyed by page id; ordering comes from each page's `index` field.
    #[serde(default)]
    pub pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
pub struct Page {
    /// Search result rank within the response.
    pub index: Option<i32>,
    #[serde(default)]
    pub imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfo {
    pub url: Option<String>,
    pub descriptionurl: Option<String>,
    pub extmetadata: Option<ExtMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct ExtMetadata {
    #[serde(rename = "Artist")]
    pub artist: Option<MetadataValue>,
    #[serde(rename = "LicenseShortName")]
    pub license_short_name: Option<MetadataValue>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataValue {
    pub value: Option<String>,
}

impl Wikimedia {
    /// Create an adapter using the public Commons endpoint.
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

    /// Map a query response into the common artifact shape.
    ///
    /// Pages arrive keyed by id, so the best match is the page with the
    /// lowest `index`. Artist values can contain markup; tags are stripped
    /// before use.
    fn map_response(response: QueryResponse) -> Result<ArtifactResult, ProviderError> {
        let pages = response.query.map(|q| q.pages).unwrap_or_default();

        let page = pages
            .into_values()
            .min_by_key(|page| page.index.unwrap_or(i32::MAX))
            .ok_or(ProviderError::NotFound)?;

        let info = page.imageinfo.into_iter().next().ok_or(ProviderError::NotFound)?;
        let url = info.url.ok_or(ProviderError::NotFound)?;

        let (author, license) = match info.extmetadata {
            Some(meta) => (
                meta.artist.and_then(|v| v.value).map(|v| strip_tags(&v)),
                meta.license_short_name.and_then(|v| v.value),
            ),
            None => (None, None),
        };

        Ok(ArtifactResult {
            url,
            attribution: Attribution {
                provider: "Wikimedia Commons".to_string(),
                author,
                license,
                source_url: info.descriptionurl,
            },
            resolved_by: PROVIDER_NAME.to_string(),
        })
    }
}

impl Default for Wikimedia {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove HTML tags from a metadata value, keeping the text content.
fn strip_tags(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_tag = false;
    for ch in value.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[async_trait]
impl ImageProvider for Wikimedia {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Search
    }

    async fn resolve(&self, request: &ArtifactRequest) -> Result<ArtifactResult, ProviderError> {
        let search = format!("filetype:bitmap {}", request.query);
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("generator", "search"),
                ("gsrsearch", search.as_str()),
                ("gsrnamespace", "6"),
                ("gsrlimit", "1"),
                ("prop", "imageinfo"),
                ("iiprop", "url|extmetadata"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!("HTTP {status}")));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("invalid response: {e}")))?;

        Self::map_response(parsed)
    }
}
