//! Interview question generation, from a role profile or from a resume.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::require_role;
use crate::llm_client::normalize::normalize;
use crate::llm_client::schema::{schema_for, SchemaKind};
use crate::llm_client::streaming::collect_fragments;
use crate::llm_client::{GenerationBackend, GenerationRequest};
use crate::models::interview::{InterviewQuestion, InterviewRequest};
use crate::outcome::{DegradeReason, Extraction};
use crate::prompts::{build_prompt, PromptInput, PromptVariant, QUESTION_COUNT};

const DEGRADED_MESSAGE: &str = "Không thể tạo câu hỏi phỏng vấn. Vui lòng thử lại.";

/// Lenient view of one backend question; ids and texts are repaired later.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionPayload {
    #[serde(default)]
    question_id: i64,
    #[serde(default)]
    question_text: String,
    #[serde(default)]
    hint: String,
}

/// Drops questions with blank text, renumbers 1..n when ids are not positive
/// and unique, and flags any count other than `QUESTION_COUNT`.
fn finalize_questions(payload: Vec<QuestionPayload>) -> Extraction<Vec<InterviewQuestion>> {
    let usable: Vec<QuestionPayload> = payload
        .into_iter()
        .filter(|q| !q.question_text.trim().is_empty())
        .collect();

    let mut seen = HashSet::new();
    let ids_valid = usable
        .iter()
        .all(|q| q.question_id > 0 && q.question_id <= u32::MAX as i64 && seen.insert(q.question_id));

    let questions: Vec<InterviewQuestion> = usable
        .into_iter()
        .enumerate()
        .map(|(i, q)| InterviewQuestion {
            question_id: if ids_valid { q.question_id as u32 } else { i as u32 + 1 },
            question_text: q.question_text.trim().to_string(),
            hint: q.hint.trim().to_string(),
        })
        .collect();

    if questions.len() == QUESTION_COUNT {
        Extraction::Parsed(questions)
    } else {
        warn!(
            "Expected {QUESTION_COUNT} interview questions, got {}",
            questions.len()
        );
        let message = format!(
            "Chỉ tạo được {}/{QUESTION_COUNT} câu hỏi phỏng vấn.",
            questions.len()
        );
        Extraction::degraded(questions, DegradeReason::UnexpectedCount, message)
    }
}

fn into_questions(raw: &str) -> Extraction<Vec<InterviewQuestion>> {
    normalize::<Vec<QuestionPayload>>(raw, Vec::new, DEGRADED_MESSAGE).and_then(finalize_questions)
}

/// Questions that test a candidate against market expectations for a role.
/// Single-shot, schema-constrained.
pub async fn generate_questions_for_role(
    backend: &dyn GenerationBackend,
    request: &InterviewRequest,
) -> Result<Extraction<Vec<InterviewQuestion>>, AppError> {
    let role = require_role(
        request.position.as_deref(),
        request.field.as_deref(),
        request.level.as_deref(),
    )?;

    let call_id = Uuid::new_v4();
    let generation = GenerationRequest::prompt(build_prompt(
        PromptVariant::InterviewQuestionsForRole,
        &PromptInput::role(role),
    ))
    .with_schema(schema_for(SchemaKind::InterviewQuestions));
    debug!(
        "[{call_id}] Role question prompt built: position={}, level={}, chars={}",
        role.position,
        role.level,
        generation.prompt_chars()
    );

    let raw = backend.generate(&generation).await?;
    let questions = into_questions(&raw);

    info!(
        "[{call_id}] Role questions generated: count={}, degraded={:?}",
        questions.value().len(),
        questions.reason()
    );
    Ok(questions)
}

/// Questions grounded in a resume, optionally aimed at a job description.
/// Streamed, schema-constrained.
pub async fn generate_questions_from_resume(
    backend: &dyn GenerationBackend,
    resume_text: &str,
    job_description: Option<&str>,
) -> Result<Extraction<Vec<InterviewQuestion>>, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("Text CV không được để trống".to_string()));
    }

    let call_id = Uuid::new_v4();
    let variant = PromptVariant::for_resume_questions(job_description);
    let generation = GenerationRequest::prompt(build_prompt(
        variant,
        &PromptInput::resume(resume_text, job_description),
    ))
    .with_schema(schema_for(SchemaKind::InterviewQuestions));
    debug!(
        "[{call_id}] Resume question prompt built: variant={variant:?}, chars={}",
        generation.prompt_chars()
    );

    let stream = backend.generate_stream(&generation).await?;
    let raw = collect_fragments(stream).await?;
    let questions = into_questions(&raw);

    info!(
        "[{call_id}] Resume questions generated: count={}, degraded={:?}",
        questions.value().len(),
        questions.reason()
    );
    Ok(questions)
}
