//! Content-generator trait seam.
//!
//! The worksheet text/structure producer is an external collaborator. The
//! engine drives it through [`ContentGenerator`]; the production
//! implementation lives in `sheetforge-providers`, tests substitute mocks.

use async_trait::async_trait;

use crate::worksheet::{WorksheetItem, WorksheetOutline, WorksheetRequest};

/// Errors from a content generator implementation.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// No credentials configured for the backing service.
    #[error("Content generation is not configured")]
    Unconfigured,

    /// The backing service was unreachable or returned a failure status.
    #[error("Content service unavailable: {0}")]
    Unavailable(String),

    /// The backing service responded with an unusable payload.
    #[error("Content service returned a malformed response: {0}")]
    Malformed(String),
}

/// Produces worksheet structure and exercise text.
///
/// Implementations are pure request/response clients: they hold no job
/// state and may be called concurrently for unrelated jobs.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Plan the worksheet structure for a request.
    async fn outline(&self, request: &WorksheetRequest)
        -> Result<WorksheetOutline, GeneratorError>;

    /// Compose the exercise items for one planned section.
    ///
    /// Returned items carry an `illustration_query` when the section plan
    /// asks for illustrations; resolved images are attached later by the
    /// illustrate step.
    async fn compose(
        &self,
        request: &WorksheetRequest,
        outline: &WorksheetOutline,
    ) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError>;
}
