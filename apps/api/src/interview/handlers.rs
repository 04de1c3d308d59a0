use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::interview::grading::grade_answers;
use crate::interview::questions::generate_questions_for_role;
use crate::models::interview::{AnswerSubmission, GradingResult, InterviewQuestion, InterviewRequest};
use crate::outcome::ExtractionEnvelope;
use crate::state::AppState;

/// POST /api/mock-interview/questions
pub async fn handle_role_questions(
    State(state): State<AppState>,
    body: Result<Json<InterviewRequest>, JsonRejection>,
) -> Result<Json<ExtractionEnvelope<Vec<InterviewQuestion>>>, AppError> {
    let Json(req) = body?;
    let questions = generate_questions_for_role(state.llm.as_ref(), &req).await?;
    Ok(Json(questions.into()))
}

/// POST /api/mock-interview/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    body: Result<Json<AnswerSubmission>, JsonRejection>,
) -> Result<Json<ExtractionEnvelope<GradingResult>>, AppError> {
    let Json(submission) = body?;
    let grading = grade_answers(state.llm.as_ref(), &submission).await?;
    Ok(Json(grading.into()))
}
