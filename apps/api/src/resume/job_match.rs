use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::normalize::{normalize, string_or_list};
use crate::llm_client::schema::{schema_for, SchemaKind};
use crate::llm_client::streaming::collect_fragments;
use crate::llm_client::{GenerationBackend, GenerationRequest};
use crate::models::resume::JobMatchResult;
use crate::outcome::Extraction;
use crate::prompts::{build_prompt, PromptInput, PromptVariant};

const FAILED_ANALYSIS: &str = "Không thể phân tích mức độ phù hợp. Vui lòng thử lại sau.";
const DEGRADED_MESSAGE: &str = "Kết quả đánh giá mức độ phù hợp không hợp lệ.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobMatchPayload {
    score: f64,
    #[serde(default, deserialize_with = "string_or_list")]
    analysis: String,
    #[serde(default, deserialize_with = "string_or_list")]
    strengths: String,
    #[serde(default, deserialize_with = "string_or_list")]
    improvements: String,
}

impl JobMatchPayload {
    fn failed() -> Self {
        Self {
            score: 0.0,
            analysis: FAILED_ANALYSIS.to_string(),
            strengths: String::new(),
            improvements: String::new(),
        }
    }

    fn into_result(self) -> JobMatchResult {
        JobMatchResult {
            score: clamp_score(self.score),
            analysis: self.analysis,
            strengths: self.strengths,
            improvements: self.improvements,
        }
    }
}

/// Clamps into [0, 100]; NaN becomes 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

/// Scores how well a resume fits a job description. Streamed, schema-constrained.
pub async fn score_job_match(
    backend: &dyn GenerationBackend,
    job_description: &str,
    resume_text: &str,
) -> Result<Extraction<JobMatchResult>, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Mô tả công việc không được để trống".to_string(),
        ));
    }
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("Text CV không được để trống".to_string()));
    }

    let call_id = Uuid::new_v4();
    let request = GenerationRequest::prompt(build_prompt(
        PromptVariant::JobMatch,
        &PromptInput::resume(resume_text, Some(job_description)),
    ))
    .with_schema(schema_for(SchemaKind::JobMatch));
    debug!(
        "[{call_id}] Job match prompt built: chars={}",
        request.prompt_chars()
    );

    let stream = backend.generate_stream(&request).await?;
    let raw = collect_fragments(stream).await?;
    debug!("[{call_id}] Job match stream drained: chars={}", raw.len());

    let result = normalize(&raw, JobMatchPayload::failed, DEGRADED_MESSAGE)
        .map(JobMatchPayload::into_result);

    info!(
        "[{call_id}] Job match finished: score={}, degraded={:?}",
        result.value().score,
        result.reason()
    );
    Ok(result)
}
