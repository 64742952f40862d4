use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// No session token was supplied on a gated request.
    #[error("Missing session token")]
    MissingSession,

    /// A token was supplied but failed signature or expiry checks.
    #[error("Invalid session token")]
    InvalidSession,

    /// Human verification was required and did not succeed.
    #[error("Verification failed")]
    VerificationFailed,

    #[error("Daily request quota exceeded")]
    QuotaExceeded { retry_after_secs: i64 },

    #[error("Generation error: {0}")]
    Generation(#[from] LlmError),

    #[error("Scrape error: {0}")]
    Scrape(String),

    #[error("Verification provider error: {0}")]
    VerificationUpstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MissingSession => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "A session token is required".to_string(),
            ),
            AppError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Session token is invalid or expired".to_string(),
            ),
            AppError::VerificationFailed => (
                StatusCode::UNAUTHORIZED,
                "VERIFICATION_FAILED",
                "Human verification did not succeed".to_string(),
            ),
            AppError::QuotaExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "QUOTA_EXCEEDED",
                "Daily request limit reached. Try again tomorrow.".to_string(),
            ),
            AppError::Generation(e) => {
                // Category split for operators: auth vs rate vs generic.
                match e {
                    LlmError::Auth { status } => {
                        tracing::error!("Generation auth failure (status {status})");
                    }
                    LlmError::RateLimited { retries } => {
                        tracing::error!("Generation rate-limited after {retries} retries");
                    }
                    other => tracing::error!("Generation error: {other}"),
                }
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Scrape(msg) => {
                tracing::error!("Scrape error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCRAPE_ERROR",
                    "A content retrieval error occurred".to_string(),
                )
            }
            AppError::VerificationUpstream(msg) => {
                tracing::error!("Verification provider error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "VERIFICATION_ERROR",
                    "Verification is temporarily unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error_body = json!({
            "code": code,
            "message": message
        });

        // Human-readable detail only in development builds.
        if cfg!(debug_assertions) {
            error_body["detail"] = json!(self.to_string());
        }

        let mut response = (status, Json(json!({ "error": error_body }))).into_response();

        if let AppError::QuotaExceeded { retry_after_secs } = self {
            if let Ok(value) = header::HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::Validation("message is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_and_invalid_session_both_map_to_401() {
        assert_eq!(
            AppError::MissingSession.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::InvalidSession.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_quota_exceeded_maps_to_429_with_retry_after() {
        let response = AppError::QuotaExceeded {
            retry_after_secs: 3600,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("3600")
        );
    }

    #[test]
    fn test_upstream_errors_map_to_502() {
        assert_eq!(
            AppError::Scrape("submit failed".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::VerificationUpstream("timeout".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_maps_to_500() {
        let response = AppError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
