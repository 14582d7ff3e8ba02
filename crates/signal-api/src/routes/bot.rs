//! 봇 제어 API 라우트.
//!
//! 봇 상태는 시스템 메트릭의 `botStatus` 필드로 관리되며, 중지 상태에서는
//! 신호 생성기가 주기를 건너뜁니다.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use signal_core::{BotStatus, MetricsPatch};

use crate::error::{hub_error_to_response, ApiResult};
use crate::state::AppState;
use crate::websocket::HubEvent;

/// 봇 제어 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct BotControlResponse {
    pub success: bool,
    pub status: BotStatus,
}

async fn set_bot_status(state: &AppState, status: BotStatus) -> ApiResult<Json<BotControlResponse>> {
    let metrics = state
        .store
        .merge_metrics(MetricsPatch::bot_status(status))
        .await
        .map_err(hub_error_to_response)?;
    info!(%status, "Bot status changed");

    state.broadcast(HubEvent::bot_status_changed(status)).await;
    if let Some(metrics) = metrics {
        state.broadcast(HubEvent::MetricsUpdated(metrics)).await;
    }

    Ok(Json(BotControlResponse {
        success: true,
        status,
    }))
}

/// 봇 시작.
///
/// POST /api/bot/start
pub async fn start_bot(State(state): State<Arc<AppState>>) -> ApiResult<Json<BotControlResponse>> {
    set_bot_status(&state, BotStatus::Active).await
}

/// 봇 중지.
///
/// POST /api/bot/stop
pub async fn stop_bot(State(state): State<Arc<AppState>>) -> ApiResult<Json<BotControlResponse>> {
    set_bot_status(&state, BotStatus::Stopped).await
}

/// 봇 제어 라우터 생성.
pub fn bot_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(start_bot))
        .route("/stop", post(stop_bot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::state::create_test_state;
    use crate::websocket::Outbound;

    fn post_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_stop_then_start() {
        let state = Arc::new(create_test_state());
        let app = Router::new().nest("/api/bot", bot_router()).with_state(state.clone());

        let response = app.clone().oneshot(post_request("/api/bot/stop")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["status"], "STOPPED");

        let metrics = state.store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.bot_status, BotStatus::Stopped);

        app.oneshot(post_request("/api/bot/start")).await.unwrap();
        let metrics = state.store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.bot_status, BotStatus::Active);
    }

    #[tokio::test]
    async fn test_stop_broadcasts_status_and_metrics() {
        let state = Arc::new(create_test_state());
        let (_conn, mut rx) = state.registry.register().await.unwrap();
        let _confirmed = rx.recv().await.unwrap();

        Router::new()
            .nest("/api/bot", bot_router())
            .with_state(state.clone())
            .oneshot(post_request("/api/bot/stop"))
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(Outbound::Event(text)) = rx.try_recv() {
            events.push(HubEvent::from_json(&text).unwrap());
        }
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], HubEvent::bot_status_changed(BotStatus::Stopped));
        assert_eq!(events[1].event_type(), "METRICS_UPDATED");
    }
}
