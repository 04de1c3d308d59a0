//! Answer grading. The backend scores each answer; the service enforces the
//! numeric invariants itself rather than trusting the returned totals.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::require_role;
use crate::llm_client::normalize::{normalize, string_or_list};
use crate::llm_client::schema::{schema_for, SchemaKind};
use crate::llm_client::{GenerationBackend, GenerationRequest};
use crate::models::interview::{AnswerSubmission, GradingResult, QuestionScore};
use crate::outcome::{DegradeReason, Extraction};
use crate::prompts::{build_prompt, PromptInput, PromptVariant};

const FAILED_FEEDBACK: &str = "Lỗi khi chấm điểm";
const RETRY_SUGGESTION: &str = "Vui lòng thử lại sau.";
const DEGRADED_MESSAGE: &str = "Không thể chấm điểm câu trả lời. Vui lòng thử lại sau.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradingPayload {
    total_score: f64,
    question_scores: Vec<ScorePayload>,
    #[serde(deserialize_with = "string_or_list")]
    general_feedback: String,
    #[serde(deserialize_with = "string_or_list")]
    improvement_suggestions: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScorePayload {
    question_id: i64,
    score: f64,
    #[serde(default, deserialize_with = "string_or_list")]
    feedback: String,
}

impl GradingPayload {
    fn failed() -> Self {
        Self {
            total_score: 0.0,
            question_scores: Vec::new(),
            general_feedback: FAILED_FEEDBACK.to_string(),
            improvement_suggestions: RETRY_SUGGESTION.to_string(),
        }
    }
}

fn failed_result() -> GradingResult {
    GradingResult {
        total_score: 0,
        question_scores: Vec::new(),
        general_feedback: FAILED_FEEDBACK.to_string(),
        improvement_suggestions: RETRY_SUGGESTION.to_string(),
    }
}

fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        0
    } else {
        score.clamp(0.0, 100.0).round() as u8
    }
}

/// round(mean(scores)); `None` for an empty slice.
pub fn mean_score(scores: &[QuestionScore]) -> Option<u8> {
    if scores.is_empty() {
        return None;
    }
    let sum: u32 = scores.iter().map(|s| u32::from(s.score)).sum();
    Some((f64::from(sum) / scores.len() as f64).round() as u8)
}

/// Keeps one score per submitted question id, clamps every score and
/// recomputes the total from what is left. A payload with no usable score is
/// a schema mismatch.
fn reconcile(payload: GradingPayload, submitted: &HashSet<u32>) -> Extraction<GradingResult> {
    let mut seen = HashSet::new();
    let question_scores: Vec<QuestionScore> = payload
        .question_scores
        .into_iter()
        .filter_map(|s| {
            let id = u32::try_from(s.question_id).ok()?;
            if !submitted.contains(&id) || !seen.insert(id) {
                warn!("Dropping score for unknown or repeated question id {}", s.question_id);
                return None;
            }
            Some(QuestionScore {
                question_id: id,
                score: clamp_score(s.score),
                feedback: s.feedback,
            })
        })
        .collect();

    let Some(total_score) = mean_score(&question_scores) else {
        warn!(
            "Grading output kept no score for {} submitted answers",
            submitted.len()
        );
        return Extraction::degraded(
            failed_result(),
            DegradeReason::SchemaMismatch,
            DEGRADED_MESSAGE,
        );
    };
    if clamp_score(payload.total_score) != total_score {
        debug!(
            "Backend total {} replaced by recomputed mean {total_score}",
            payload.total_score
        );
    }

    Extraction::Parsed(GradingResult {
        total_score,
        question_scores,
        general_feedback: payload.general_feedback,
        improvement_suggestions: payload.improvement_suggestions,
    })
}

pub async fn grade_answers(
    backend: &dyn GenerationBackend,
    submission: &AnswerSubmission,
) -> Result<Extraction<GradingResult>, AppError> {
    let role = require_role(
        submission.position.as_deref(),
        submission.field.as_deref(),
        submission.level.as_deref(),
    )?;
    if submission.answers.is_empty() {
        return Err(AppError::Validation(
            "Vui lòng cung cấp đầy đủ thông tin và câu trả lời.".to_string(),
        ));
    }

    let call_id = Uuid::new_v4();
    let request = GenerationRequest::prompt(build_prompt(
        PromptVariant::Grading,
        &PromptInput::grading(role, &submission.answers),
    ))
    .with_schema(schema_for(SchemaKind::GradingResult));
    debug!(
        "[{call_id}] Grading prompt built: answers={}, chars={}",
        submission.answers.len(),
        request.prompt_chars()
    );

    let raw = backend.generate(&request).await?;
    let submitted: HashSet<u32> = submission.answers.iter().map(|a| a.question_id).collect();
    let result = normalize(&raw, GradingPayload::failed, DEGRADED_MESSAGE)
        .and_then(|payload| reconcile(payload, &submitted));

    info!(
        "[{call_id}] Grading finished: total={}, scored={}/{}, degraded={:?}",
        result.value().total_score,
        result.value().question_scores.len(),
        submission.answers.len(),
        result.reason()
    );
    Ok(result)
}
