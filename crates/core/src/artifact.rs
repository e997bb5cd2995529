//! Artifact request/result types exchanged with image providers.
//!
//! An [`ArtifactRequest`] describes one needed media item; the fallback
//! resolver turns it into at most one [`ArtifactResult`]. Providers map
//! their native response shapes into this common form.

use serde::{Deserialize, Serialize};

/// The kind of artifact a generation step needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// An illustrative image for a worksheet item.
    Illustration,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Illustration => write!(f, "illustration"),
        }
    }
}

/// A description of one needed artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRequest {
    /// What kind of artifact is needed.
    pub kind: ArtifactKind,
    /// Search query or generation prompt.
    pub query: String,
    /// Prefer an AI image generator over stock-photo search.
    pub prefer_generative: bool,
}

impl ArtifactRequest {
    /// Convenience constructor for an illustration request.
    pub fn illustration(query: impl Into<String>, prefer_generative: bool) -> Self {
        Self {
            kind: ArtifactKind::Illustration,
            query: query.into(),
            prefer_generative,
        }
    }
}

/// Attribution metadata for a resolved artifact.
///
/// Search providers supply author/license/source; generated images carry
/// only the provider name and a `"generated"` license marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attribution {
    /// Human-readable provider name (e.g. `"Pexels"`).
    pub provider: String,
    /// Creator of the media, when the provider reports one.
    pub author: Option<String>,
    /// License short name (e.g. `"CC BY-SA 4.0"`).
    pub license: Option<String>,
    /// Page where the media originates, for attribution links.
    pub source_url: Option<String>,
}

/// A resolved artifact, ready to embed into the worksheet document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactResult {
    /// Direct URL of the media.
    pub url: String,
    /// Attribution metadata.
    pub attribution: Attribution,
    /// Identifying name of the adapter that produced this result.
    pub resolved_by: String,
}
