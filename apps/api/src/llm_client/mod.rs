/// LLM Client: the single point of entry for all Gemini calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Orchestrators depend on the `GenerationBackend` trait; `GeminiClient` is
/// the production implementation, built once at startup and shared.
///
/// One logical request = one HTTP round trip. There is no retry loop here:
/// failures are classified into `LlmError` at the call site and surfaced.
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

pub mod normalize;
pub mod prompts;
pub mod schema;
pub mod streaming;
#[cfg(test)]
pub mod testing;
pub mod types;

use streaming::{FragmentStream, SseFragmentStream};
use types::{ApiErrorEnvelope, GenerateContentBody, GenerateContentResponse};
pub use types::GenerationRequest;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Backend rejected credentials (status {status}): {message}")]
    Auth { status: u16, message: String },

    #[error("Backend call timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),
}

impl LlmError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else if e.is_decode() {
            LlmError::Decode(e.to_string())
        } else {
            LlmError::Transport(e.to_string())
        }
    }

    /// Classifies a non-success response from its status and structured body.
    fn from_status(status: StatusCode, body: &str) -> Self {
        let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
        let message = parsed
            .as_ref()
            .map(|e| e.error.message.clone())
            .unwrap_or_else(|| body.chars().take(500).collect());
        let invalid_key = parsed
            .as_ref()
            .map(|e| {
                e.error.has_reason("API_KEY_INVALID")
                    || e.error.status.as_deref() == Some("UNAUTHENTICATED")
            })
            .unwrap_or(false);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth {
                status: status.as_u16(),
                message,
            },
            StatusCode::BAD_REQUEST if invalid_key => LlmError::Auth {
                status: status.as_u16(),
                message,
            },
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => LlmError::Timeout,
            _ => LlmError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// The seam between orchestrators and the generation backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// One blocking call; returns the aggregated text of the response.
    /// A response with no text yields an empty string, not an error.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Opens a streamed call. The returned stream owns the connection.
    async fn generate_stream(&self, request: &GenerationRequest)
        -> Result<FragmentStream, LlmError>;
}

/// Settings for `GeminiClient`, taken from `Config` at startup.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Gemini REST client. Cheap to clone; the inner `reqwest::Client` pools
/// connections and is safe to share across tasks.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: settings.api_key,
            model: settings.model,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/{API_VERSION}/models/{}:{method}",
            self.base_url, self.model
        )
    }

    async fn post(&self, url: String, request: &GenerationRequest) -> Result<Response, LlmError> {
        let body = GenerateContentBody::from(request);

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini request failed: {e}");
                LlmError::from_reqwest(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {status}: {body}");
            return Err(LlmError::from_status(status, &body));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let started = std::time::Instant::now();
        let response = self.post(self.endpoint("generateContent"), request).await?;

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                LlmError::Decode(e.to_string())
            } else {
                LlmError::from_reqwest(e)
            }
        })?;

        if let Some(reason) = body.block_reason() {
            warn!("Gemini blocked the prompt: {reason}");
        }

        let text = body.text().unwrap_or_default();
        debug!(
            "Gemini call succeeded: model={}, constrained={}, finish_reason={:?}, chars={}, duration_ms={}",
            self.model,
            request.is_constrained(),
            body.finish_reason(),
            text.len(),
            started.elapsed().as_millis()
        );
        Ok(text)
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, LlmError> {
        let url = format!("{}?alt=sse", self.endpoint("streamGenerateContent"));
        let response = self.post(url, request).await?;
        debug!(
            "Gemini stream opened: model={}, constrained={}",
            self.model,
            request.is_constrained()
        );
        Ok(SseFragmentStream::new(response.bytes_stream()).boxed())
    }
}
