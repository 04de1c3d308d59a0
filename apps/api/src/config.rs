use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{GeminiSettings, DEFAULT_API_BASE_URL};

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_MIN_EXTRACTED_CHARS: usize = 50;

/// Application configuration loaded from environment variables.
/// Startup fails if `GEMINI_API_KEY` is missing or a number does not parse.
#[derive(Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_api_base_url: String,
    pub gemini_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
    pub cors_allowed_origins: Vec<String>,
    /// Uploads whose extracted text is shorter than this are rejected.
    pub min_extracted_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            gemini_api_key: get("GEMINI_API_KEY").with_context(|| {
                "Required environment variable 'GEMINI_API_KEY' is not set".to_string()
            })?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_api_base_url: get("GEMINI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            gemini_timeout: Duration::from_secs(
                get("GEMINI_TIMEOUT_SECS")
                    .map(|v| v.parse::<u64>())
                    .transpose()
                    .context("GEMINI_TIMEOUT_SECS must be a whole number of seconds")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            min_extracted_chars: get("MIN_EXTRACTED_CHARS")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("MIN_EXTRACTED_CHARS must be a non-negative integer")?
                .unwrap_or(DEFAULT_MIN_EXTRACTED_CHARS),
        })
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_key: self.gemini_api_key.clone(),
            model: self.gemini_model.clone(),
            base_url: self.gemini_api_base_url.clone(),
            timeout: self.gemini_timeout,
        }
    }
}
