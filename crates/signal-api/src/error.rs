//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidationErrors;

use signal_core::HubError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "ALREADY_RESOLVED",
///   "message": "signal 7 already resolved",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "VALIDATION_ERROR", "UNSUPPORTED_PLATFORM")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// # Example
    ///
    /// ```
    /// use signal_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("UNSUPPORTED_PLATFORM", "Unsupported platform: foo");
    /// assert!(error.timestamp.is_some());
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: None,
        }
    }

    /// 에러 코드 반환.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 에러 메시지 반환.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

// ==================== Result Type Alias ====================

/// API 에러 응답 튜플.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

// ==================== 에러 변환 ====================

/// HubError를 HTTP 응답으로 변환.
pub fn hub_error_to_response(err: HubError) -> ApiError {
    let (status, code) = match &err {
        HubError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        HubError::AlreadyResolved(_) => (StatusCode::CONFLICT, "ALREADY_RESOLVED"),
        HubError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        HubError::Serialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERIALIZATION_ERROR"),
        HubError::Transport(_)
        | HubError::Cycle(_)
        | HubError::Config(_)
        | HubError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };

    if !err.is_client_error() {
        tracing::error!(error = %err, "Request failed");
    }

    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}

/// 입력 검증 에러를 HTTP 응답으로 변환.
pub fn validation_errors_to_response(errors: ValidationErrors) -> ApiError {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: invalid value", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

/// JSON 본문 파싱 실패를 HTTP 응답으로 변환.
pub fn json_rejection_to_response(rejection: JsonRejection) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("INVALID_BODY", rejection.body_text())),
    )
}
