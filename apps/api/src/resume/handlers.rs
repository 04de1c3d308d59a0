use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::documents::{extract_text, require_text, DocumentError};
use crate::errors::AppError;
use crate::interview::questions::generate_questions_from_resume;
use crate::models::interview::InterviewQuestion;
use crate::models::resume::{JobMatchResult, ResumeAnalysis};
use crate::outcome::ExtractionEnvelope;
use crate::resume::analyzer::analyze_resume;
use crate::resume::job_match::score_job_match;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub extracted_text: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeTextRequest {
    #[serde(default)]
    pub text: String,
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resume_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeQuestionsRequest {
    #[serde(default)]
    pub resume_text: String,
    pub job_description: Option<String>,
}

/// POST /api/resume/upload
/// Text extraction only; analysis is a separate call.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            upload = Some((filename, bytes));
            break;
        }
    }
    let (filename, bytes) = upload.ok_or(DocumentError::Empty)?;
    info!("Upload received: filename={filename:?}, bytes={}", bytes.len());

    let name = filename.clone();
    let text = tokio::task::spawn_blocking(move || extract_text(&name, &bytes))
        .await
        .map_err(|e| anyhow!("Text extraction task failed: {e}"))??;
    let extracted_text = require_text(text, state.config.min_extracted_chars)?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Trích xuất text thành công".to_string(),
        extracted_text,
        filename,
    }))
}

/// POST /api/resume/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    body: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> Result<Json<ExtractionEnvelope<ResumeAnalysis>>, AppError> {
    let Json(req) = body?;
    let analysis = analyze_resume(state.llm.as_ref(), &req.text, req.job_description.as_deref()).await?;
    Ok(Json(analysis.into()))
}

/// POST /api/resume/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    body: Result<Json<JobMatchRequest>, JsonRejection>,
) -> Result<Json<ExtractionEnvelope<JobMatchResult>>, AppError> {
    let Json(req) = body?;
    let result = score_job_match(state.llm.as_ref(), &req.job_description, &req.resume_text).await?;
    Ok(Json(result.into()))
}

/// POST /api/resume/generate-interview-questions
pub async fn handle_resume_questions(
    State(state): State<AppState>,
    body: Result<Json<ResumeQuestionsRequest>, JsonRejection>,
) -> Result<Json<ExtractionEnvelope<Vec<InterviewQuestion>>>, AppError> {
    let Json(req) = body?;
    let questions = generate_questions_from_resume(
        state.llm.as_ref(),
        &req.resume_text,
        req.job_description.as_deref(),
    )
    .await?;
    Ok(Json(questions.into()))
}
