use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// User-facing messages are Vietnamese; upstream details are logged only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Generation backend error: {0}")]
    Upstream(#[from] LlmError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Dữ liệu yêu cầu không hợp lệ: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("File quá lớn (tối đa 10MB)".to_string())
        } else {
            AppError::Validation(format!("Dữ liệu upload không hợp lệ: {}", e.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Upstream(e) => {
                tracing::error!("Generation backend error: {e}");
                match e {
                    LlmError::Auth { .. } => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_AUTH_ERROR",
                        "Lỗi xác thực API Gemini. Vui lòng kiểm tra cấu hình.".to_string(),
                    ),
                    LlmError::Timeout => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "UPSTREAM_TIMEOUT",
                        "Timeout khi gọi API Gemini. Vui lòng thử lại.".to_string(),
                    ),
                    LlmError::Transport(_) | LlmError::Api { .. } | LlmError::Decode(_) => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "Lỗi khi phân tích với Gemini. Vui lòng thử lại sau.".to_string(),
                    ),
                }
            }
            AppError::Document(e) => {
                tracing::warn!("Document extraction failed: {e}");
                let (status, code) = match e {
                    DocumentError::Empty | DocumentError::UnsupportedType(_) => {
                        (StatusCode::BAD_REQUEST, "INVALID_FILE")
                    }
                    DocumentError::TooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE")
                    }
                    _ => (StatusCode::UNPROCESSABLE_ENTITY, "UNREADABLE_DOCUMENT"),
                };
                (status, code, e.user_message().to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Đã xảy ra lỗi hệ thống".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn render(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_message_is_surfaced() {
        let (status, body) = render(AppError::Validation("Vị trí không được để trống".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Vị trí không được để trống");
    }

    #[tokio::test]
    async fn test_auth_error_hides_backend_message() {
        let (status, body) = render(AppError::Upstream(LlmError::Auth {
            status: 400,
            message: "API key not valid: sk-secret".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("xác thực"));
        assert!(!message.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_gateway_timeout() {
        let (status, body) = render(AppError::Upstream(LlmError::Timeout)).await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "UPSTREAM_TIMEOUT");
    }

    #[tokio::test]
    async fn test_api_error_is_bad_gateway() {
        let (status, _) = render(AppError::Upstream(LlmError::Api {
            status: 500,
            message: "boom".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
