//! 거래 플랫폼 연결 API 라우트.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use signal_core::{lookup_platform, supported_platforms, MetricsPatch, PlatformInfo};

use crate::error::{hub_error_to_response, json_rejection_to_response, ApiErrorResponse, ApiResult};
use crate::state::AppState;
use crate::websocket::HubEvent;

/// 플랫폼 연결 요청.
///
/// 자격 증명은 받지만 사용하지 않습니다.
#[derive(Debug, Deserialize)]
pub struct ConnectPlatformRequest {
    pub platform: String,
    #[serde(default)]
    pub credentials: Option<serde_json::Value>,
}

/// 플랫폼 연결 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectPlatformResponse {
    pub success: bool,
    #[serde(flatten)]
    pub info: PlatformInfo,
}

/// 플랫폼 연결.
///
/// 지원 목록에 있으면 메트릭의 `platform`을 바꾸고 `PLATFORM_CONNECTED`를 브로드캐스트합니다.
/// POST /api/platforms/connect
pub async fn connect_platform(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ConnectPlatformRequest>, JsonRejection>,
) -> ApiResult<Json<ConnectPlatformResponse>> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    let Some(info) = lookup_platform(&request.platform) else {
        warn!(platform = %request.platform, "Unsupported platform requested");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::with_details(
                "UNSUPPORTED_PLATFORM",
                format!("Unsupported platform: {}", request.platform),
                json!({ "supported": supported_platforms() }),
            )),
        ));
    };

    state
        .store
        .merge_metrics(MetricsPatch::platform(info.platform.clone()))
        .await
        .map_err(hub_error_to_response)?;
    info!(
        platform = %info.platform,
        with_credentials = request.credentials.is_some(),
        "Platform connected"
    );

    state.broadcast(HubEvent::PlatformConnected(info.clone())).await;

    Ok(Json(ConnectPlatformResponse {
        success: true,
        info,
    }))
}

/// 플랫폼 라우터 생성.
pub fn platforms_router() -> Router<Arc<AppState>> {
    Router::new().route("/connect", post(connect_platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Method, http::Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::create_test_state;

    async fn connect(state: Arc<AppState>, platform: &str) -> (StatusCode, Value) {
        let response = Router::new()
            .nest("/api/platforms", platforms_router())
            .with_state(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/platforms/connect")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "platform": platform }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_connect_supported_platform() {
        let state = Arc::new(create_test_state());
        let (status, body) = connect(state.clone(), "bybit").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["platform"], "bybit");
        assert_eq!(body["status"], "ready");
        assert_eq!(body["features"], json!(["crypto", "1m_to_1W"]));

        let metrics = state.store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.platform, "bybit");
    }

    #[tokio::test]
    async fn test_connect_unknown_platform() {
        let state = Arc::new(create_test_state());
        let (status, body) = connect(state.clone(), "robinhood").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "UNSUPPORTED_PLATFORM");
        assert_eq!(body["details"]["supported"].as_array().unwrap().len(), 5);

        let metrics = state.store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.platform, "quotex");
    }
}
