//! 대시보드 조회 API 라우트.
//!
//! - `GET /api/metrics` - 시스템 메트릭
//! - `GET /api/stats/today` - 당일 통계

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::sync::Arc;

use signal_core::{SystemMetrics, TodayStats};

use crate::error::{hub_error_to_response, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 현재 시스템 메트릭.
///
/// 메트릭이 초기화되지 않았으면 404를 반환합니다.
/// GET /api/metrics
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> ApiResult<Json<SystemMetrics>> {
    state
        .store
        .metrics()
        .await
        .map_err(hub_error_to_response)?
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiErrorResponse::new(
                    "METRICS_NOT_INITIALIZED",
                    "System metrics are not initialized",
                )),
            )
        })
}

/// 당일 통계.
///
/// GET /api/stats/today
pub async fn get_today_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<TodayStats>> {
    let stats = state
        .store
        .today_stats()
        .await
        .map_err(hub_error_to_response)?;
    Ok(Json(stats))
}

/// 메트릭 라우터 생성.
pub fn metrics_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_metrics))
}

/// 통계 라우터 생성.
pub fn stats_router() -> Router<Arc<AppState>> {
    Router::new().route("/today", get(get_today_stats))
}
