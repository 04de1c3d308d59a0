pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::documents::MAX_SIZE_BYTES;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted file.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route("/api/resume/health", get(health::health_handler))
        .route("/api/resume/upload", post(resume::handle_upload))
        .route("/api/resume/analyze-text", post(resume::handle_analyze_text))
        .route("/api/resume/job-match", post(resume::handle_job_match))
        .route(
            "/api/resume/generate-interview-questions",
            post(resume::handle_resume_questions),
        )
        .route(
            "/api/resume/interview-questions",
            post(resume::handle_resume_questions),
        )
        // Mock interview API
        .route(
            "/api/mock-interview/questions",
            post(interview::handle_role_questions),
        )
        .route("/api/mock-interview/submit", post(interview::handle_submit))
        .layer(DefaultBodyLimit::max(MAX_SIZE_BYTES + UPLOAD_OVERHEAD_BYTES))
        .with_state(state)
}
