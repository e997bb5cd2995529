//! Worksheet request and document model, plus submission validation.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactResult;
use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum length accepted for subject/grade/topic fields.
pub const MAX_FIELD_LEN: usize = 200;
/// Maximum number of exercise items per worksheet.
pub const MAX_ITEM_COUNT: u32 = 20;
/// Item count used when the request does not specify one.
pub const DEFAULT_ITEM_COUNT: u32 = 8;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A worksheet generation request as submitted by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetRequest {
    /// Subject area, e.g. `"Biology"`.
    pub subject: String,
    /// Grade band, e.g. `"Grade 4"`.
    pub grade: String,
    /// Topic within the subject, e.g. `"Photosynthesis"`.
    pub topic: String,
    /// Number of exercise items to produce. Defaults to [`DEFAULT_ITEM_COUNT`].
    pub item_count: Option<u32>,
    /// Optional tone hint for the content generator, e.g. `"playful"`.
    pub tone: Option<String>,
    /// Prefer AI-generated illustrations over stock-photo search.
    #[serde(default)]
    pub prefer_generated_images: bool,
}

impl WorksheetRequest {
    /// Effective item count after applying the default.
    pub fn effective_item_count(&self) -> u32 {
        self.item_count.unwrap_or(DEFAULT_ITEM_COUNT)
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate that a required text field is non-empty and within length limits.
pub fn validate_text_field(name: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{name} must not be empty")));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(CoreError::Validation(format!(
            "{name} exceeds maximum length of {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a full worksheet request at the submission boundary.
pub fn validate_request(request: &WorksheetRequest) -> Result<(), CoreError> {
    validate_text_field("subject", &request.subject)?;
    validate_text_field("grade", &request.grade)?;
    validate_text_field("topic", &request.topic)?;

    if let Some(count) = request.item_count {
        if count == 0 || count > MAX_ITEM_COUNT {
            return Err(CoreError::Validation(format!(
                "item_count must be between 1 and {MAX_ITEM_COUNT}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// The planned structure of a worksheet, produced by the outline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetOutline {
    /// Display title for the worksheet.
    pub title: String,
    /// Planned sections in presentation order.
    pub sections: Vec<SectionPlan>,
}

/// Plan for one worksheet section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionPlan {
    /// Section heading, e.g. `"Label the diagram"`.
    pub heading: String,
    /// Number of exercise items in this section.
    pub item_count: u32,
    /// Whether items in this section should carry an illustration.
    pub illustrate: bool,
}

// ---------------------------------------------------------------------------
// Items and document
// ---------------------------------------------------------------------------

/// One exercise item.
///
/// The compose step fills the textual fields; the illustrate step attaches
/// the resolved image (when the item carries an illustration query).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetItem {
    /// The exercise prompt shown to the student.
    pub prompt: String,
    /// Expected answer, when the item has a closed form.
    pub answer: Option<String>,
    /// Image search/generation query for this item, if it needs one.
    pub illustration_query: Option<String>,
    /// Resolved illustration. `None` when the item needs no image or the
    /// provider chain was exhausted under the placeholder policy.
    pub illustration: Option<ArtifactResult>,
}

/// One assembled worksheet section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetSection {
    pub heading: String,
    pub items: Vec<WorksheetItem>,
}

/// The final assembled worksheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorksheetDocument {
    pub title: String,
    pub subject: String,
    pub grade: String,
    pub topic: String,
    pub sections: Vec<WorksheetSection>,
    pub generated_at: Timestamp,
}
