//! Error Handling Module
//!
//! Maps ledger errors to HTTP status codes.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ledger::LedgerError;

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 HTTP 상태 코드에 매핑됨
/// - 400: ValidationError, InvalidArgument
/// - 404: NotFound
/// - 409: Conflict, InvalidState
/// - 500: 저장소 에러 (상세 정보는 로그로만)
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 409 Conflict ============
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // ============ 500 Internal Server Error ============
    #[error("Store error: {0}")]
    StoreError(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::ValidationError(_)
            | ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::InvalidState(_) => StatusCode::CONFLICT,
            ApiError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message, details) = match &self {
            // 4xx 클라이언트 에러
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg.clone(), None),
            ApiError::ValidationError(msg) => (
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(msg.clone()),
            ),
            ApiError::InvalidArgument(msg) => (
                "INVALID_ARGUMENT",
                "Invalid argument".to_string(),
                Some(msg.clone()),
            ),
            ApiError::NotFound(resource) => {
                ("NOT_FOUND", format!("{} not found", resource), None)
            }
            ApiError::Conflict(msg) => (
                "CONFLICT",
                "Request conflicts with an existing record".to_string(),
                Some(msg.clone()),
            ),
            ApiError::InvalidState(msg) => (
                "INVALID_STATE",
                "Operation not allowed in the current state".to_string(),
                Some(msg.clone()),
            ),

            // 5xx 서버 에러: 상세 정보 노출 안 함
            ApiError::StoreError(_) => {
                tracing::error!("Store error: {:?}", self);
                ("STORE_ERROR", "Ledger store error occurred".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// LedgerError를 ApiError로 변환
impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) => ApiError::ValidationError(msg),
            LedgerError::InvalidArgument(msg) => ApiError::InvalidArgument(msg),
            LedgerError::Conflict(msg) => ApiError::Conflict(msg),
            LedgerError::NotFound(resource) => ApiError::NotFound(resource),
            LedgerError::InvalidState(msg) => ApiError::InvalidState(msg),
            LedgerError::Store(msg) => ApiError::StoreError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_status_mapping() {
        let cases = [
            (LedgerError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (LedgerError::Conflict("x".into()), StatusCode::CONFLICT),
            (LedgerError::NotFound("Debt".into()), StatusCode::NOT_FOUND),
            (LedgerError::InvalidState("x".into()), StatusCode::CONFLICT),
            (LedgerError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_store_error_hides_details() {
        let response = ApiError::from(LedgerError::Store("password=hunter2".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "STORE_ERROR");
        assert!(body.get("details").is_none());
        assert!(!body.to_string().contains("hunter2"));
    }
}
