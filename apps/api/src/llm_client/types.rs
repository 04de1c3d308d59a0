//! Wire types for the Gemini `generateContent` family of endpoints.

use serde::{Deserialize, Serialize};

use crate::llm_client::schema::GenerationSchema;

/// One text part of a content block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

/// A role plus its ordered text parts. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub role: String,
    pub parts: Vec<Part>,
}

impl ContentBlock {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Everything the backend needs for one logical generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub contents: Vec<ContentBlock>,
    pub schema: Option<GenerationSchema>,
}

impl GenerationRequest {
    /// A single user turn, unconstrained.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![ContentBlock::user(text)],
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: GenerationSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn is_constrained(&self) -> bool {
        self.schema.is_some()
    }

    /// Total prompt characters, for logging.
    pub fn prompt_chars(&self) -> usize {
        self.contents
            .iter()
            .flat_map(|c| c.parts.iter())
            .map(|p| p.text.chars().count())
            .sum()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody<'a> {
    pub contents: &'a [ContentBlock],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig<'a> {
    pub response_mime_type: &'static str,
    pub response_schema: &'a GenerationSchema,
}

impl<'a> From<&'a GenerationRequest> for GenerateContentBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            contents: &request.contents,
            generation_config: request.schema.as_ref().map(|schema| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            }),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Responses: every nesting level is optional
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, or `None` when any
    /// level of candidate → content → parts → text is absent.
    pub fn text(&self) -> Option<String> {
        let parts = self
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?;

        let mut texts = parts.iter().filter_map(|p| p.text.as_deref()).peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.as_deref())
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status", "details"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ApiErrorBody {
    pub fn has_reason(&self, reason: &str) -> bool {
        self.details
            .iter()
            .any(|d| d.reason.as_deref() == Some(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::schema::{schema_for, SchemaKind};
    use serde_json::json;

    #[test]
    fn test_unconstrained_body_has_no_generation_config() {
        let request = GenerationRequest::prompt("hello");
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_constrained_body_sets_mime_type_and_schema() {
        let request =
            GenerationRequest::prompt("grade").with_schema(schema_for(SchemaKind::JobMatch));
        let body = serde_json::to_value(GenerateContentBody::from(&request)).unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_text_is_none_for_every_missing_level() {
        for value in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {}}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{}]}}]}),
        ] {
            let response: GenerateContentResponse = serde_json::from_value(value.clone()).unwrap();
            assert!(response.text().is_none(), "expected no text for {value}");
        }
    }

    #[test]
    fn test_block_reason_is_exposed() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert_eq!(response.block_reason(), Some("SAFETY"));
    }
}
