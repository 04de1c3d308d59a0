use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::GenerationBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// One backend for the whole process. `GeminiClient` in production.
    pub llm: Arc<dyn GenerationBackend>,
    pub config: Config,
}
