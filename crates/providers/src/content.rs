//! OpenAI-backed content generator.
//!
//! Implements the [`ContentGenerator`] seam with chat-completion calls that
//! return structured JSON. When `OPENAI_API_KEY` is absent the generator
//! stays constructible and every call reports
//! [`GeneratorError::Unconfigured`], so jobs fail cleanly instead of the
//! process refusing to start.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use sheetforge_core::content::{ContentGenerator, GeneratorError};
use sheetforge_core::worksheet::{
    SectionPlan, WorksheetItem, WorksheetOutline, WorksheetRequest,
};

/// Default OpenAI API base URL.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
/// Default chat model for worksheet text.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Per-call timeout for content requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Content generator backed by the OpenAI chat completions API.
pub struct OpenAiContentGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// JSON payload the model is asked to produce for the outline step.
#[derive(Debug, Deserialize)]
struct OutlinePayload {
    title: String,
    sections: Vec<SectionPayload>,
}

#[derive(Debug, Deserialize)]
struct SectionPayload {
    heading: String,
    item_count: u32,
    #[serde(default)]
    illustrate: bool,
}

/// JSON payload the model is asked to produce for the compose step.
#[derive(Debug, Deserialize)]
struct ComposePayload {
    sections: Vec<ComposedSection>,
}

#[derive(Debug, Deserialize)]
struct ComposedSection {
    items: Vec<ItemPayload>,
}

#[derive(Debug, Deserialize)]
struct ItemPayload {
    prompt: String,
    answer: Option<String>,
    illustration_query: Option<String>,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

impl OpenAiContentGenerator {
    /// Build from the environment.
    ///
    /// | Env Var           | Default                    |
    /// |-------------------|----------------------------|
    /// | `OPENAI_API_KEY`  | unset (calls fail cleanly) |
    /// | `CONTENT_MODEL`   | `gpt-4o-mini`              |
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set; content generation will report as unconfigured");
        }

        let model = std::env::var("CONTENT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            model,
        }
    }

    /// Build against a custom base URL (used by tests).
    pub fn with_base_url(api_key: Option<String>, api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            api_url,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Issue one JSON-mode chat call and return the message content.
    async fn chat(&self, system: &str, user: String) -> Result<String, GeneratorError> {
        let api_key = self.api_key.as_ref().ok_or(GeneratorError::Unconfigured)?;

        let body = serde_json::json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::Unavailable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeneratorError::Unavailable(format!("HTTP {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Malformed(e.without_url().to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GeneratorError::Malformed("empty completion".to_string()))
    }
}

/// Parse the outline-step JSON content into the domain outline.
fn parse_outline(content: &str) -> Result<WorksheetOutline, GeneratorError> {
    let payload: OutlinePayload = serde_json::from_str(content)
        .map_err(|e| GeneratorError::Malformed(format!("outline payload: {e}")))?;

    if payload.sections.is_empty() {
        return Err(GeneratorError::Malformed("outline has no sections".to_string()));
    }

    Ok(WorksheetOutline {
        title: payload.title,
        sections: payload
            .sections
            .into_iter()
            .map(|s| SectionPlan {
                heading: s.heading,
                item_count: s.item_count,
                illustrate: s.illustrate,
            })
            .collect(),
    })
}

/// Parse the compose-step JSON content into per-section item lists.
///
/// The model must return exactly one entry per planned section; anything
/// else is a malformed payload.
fn parse_items(
    content: &str,
    expected_sections: usize,
) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError> {
    let payload: ComposePayload = serde_json::from_str(content)
        .map_err(|e| GeneratorError::Malformed(format!("compose payload: {e}")))?;

    if payload.sections.len() != expected_sections {
        return Err(GeneratorError::Malformed(format!(
            "expected {expected_sections} sections, got {}",
            payload.sections.len()
        )));
    }

    Ok(payload
        .sections
        .into_iter()
        .map(|section| {
            section
                .items
                .into_iter()
                .map(|item| WorksheetItem {
                    prompt: item.prompt,
                    answer: item.answer,
                    illustration_query: item.illustration_query,
                    illustration: None,
                })
                .collect()
        })
        .collect())
}

const OUTLINE_SYSTEM: &str = "You are a curriculum designer. Respond with a single JSON object: \
    {\"title\": string, \"sections\": [{\"heading\": string, \"item_count\": integer, \
    \"illustrate\": boolean}]}.";

const COMPOSE_SYSTEM: &str = "You are a worksheet author. Respond with a single JSON object: \
    {\"sections\": [{\"items\": [{\"prompt\": string, \"answer\": string or null, \
    \"illustration_query\": string or null}]}]}. Produce exactly one entry per requested \
    section, in order.";

#[async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    async fn outline(
        &self,
        request: &WorksheetRequest,
    ) -> Result<WorksheetOutline, GeneratorError> {
        let tone = request.tone.as_deref().unwrap_or("neutral");
        let user = format!(
            "Plan a {} worksheet for {} on the topic \"{}\" with about {} exercise items \
             total. Tone: {tone}.",
            request.subject,
            request.grade,
            request.topic,
            request.effective_item_count(),
        );

        let content = self.chat(OUTLINE_SYSTEM, user).await?;
        parse_outline(&content)
    }

    async fn compose(
        &self,
        request: &WorksheetRequest,
        outline: &WorksheetOutline,
    ) -> Result<Vec<Vec<WorksheetItem>>, GeneratorError> {
        let plan = outline
            .sections
            .iter()
            .map(|s| {
                format!(
                    "- \"{}\": {} items{}",
                    s.heading,
                    s.item_count,
                    if s.illustrate {
                        ", each with an illustration_query"
                    } else {
                        ""
                    }
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let user = format!(
            "Write the items for the worksheet \"{}\" ({} / {} / {}). Sections:\n{plan}",
            outline.title, request.subject, request.grade, request.topic,
        );

        let content = self.chat(COMPOSE_SYSTEM, user).await?;
        parse_items(&content, outline.sections.len())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parses_outline_payload() {
        let content = r#"{
            "title": "Photosynthesis Basics",
            "sections": [
                { "heading": "Vocabulary", "item_count": 4, "illustrate": false },
                { "heading": "Label the diagram", "item_count": 2, "illustrate": true }
            ]
        }"#;

        let outline = parse_outline(content).unwrap();
        assert_eq!(outline.title, "Photosynthesis Basics");
        assert_eq!(outline.sections.len(), 2);
        assert!(outline.sections[1].illustrate);
    }

    #[test]
    fn outline_without_sections_is_malformed() {
        let err = parse_outline(r#"{ "title": "Empty", "sections": [] }"#).unwrap_err();
        assert_matches!(err, GeneratorError::Malformed(_));
    }

    #[test]
    fn outline_with_invalid_json_is_malformed() {
        assert_matches!(
            parse_outline("not json"),
            Err(GeneratorError::Malformed(_))
        );
    }

    #[test]
    fn parses_items_per_section() {
        let content = r#"{
            "sections": [
                { "items": [
                    { "prompt": "Define chlorophyll.", "answer": "The green pigment...",
                      "illustration_query": null }
                ]},
                { "items": [
                    { "prompt": "Label the leaf parts.", "answer": null,
                      "illustration_query": "leaf cross section diagram" }
                ]}
            ]
        }"#;

        let sections = parse_items(content, 2).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0][0].prompt, "Define chlorophyll.");
        assert!(sections[0][0].illustration.is_none());
        assert_eq!(
            sections[1][0].illustration_query.as_deref(),
            Some("leaf cross section diagram")
        );
    }

    #[test]
    fn section_count_mismatch_is_malformed() {
        let content = r#"{ "sections": [ { "items": [] } ] }"#;
        assert_matches!(parse_items(content, 2), Err(GeneratorError::Malformed(_)));
    }

    #[tokio::test]
    async fn unconfigured_generator_reports_cleanly() {
        let generator =
            OpenAiContentGenerator::with_base_url(None, "http://127.0.0.1:9".to_string());
        let request = WorksheetRequest {
            subject: "Biology".to_string(),
            grade: "Grade 4".to_string(),
            topic: "Photosynthesis".to_string(),
            item_count: None,
            tone: None,
            prefer_generated_images: false,
        };

        let err = generator.outline(&request).await.unwrap_err();
        assert_matches!(err, GeneratorError::Unconfigured);
    }
}
