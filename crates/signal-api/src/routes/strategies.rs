//! 전략 API 라우트.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use signal_core::Strategy;

use super::signals::SuccessResponse;
use crate::error::{hub_error_to_response, json_rejection_to_response, ApiResult};
use crate::state::AppState;
use crate::websocket::HubEvent;

/// 전략 활성화 변경 요청.
#[derive(Debug, Deserialize)]
pub struct ToggleStrategyRequest {
    pub enabled: bool,
}

/// 전략 목록 (ID순).
///
/// GET /api/strategies
pub async fn list_strategies(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Strategy>>> {
    let strategies = state
        .store
        .list_strategies()
        .await
        .map_err(hub_error_to_response)?;
    Ok(Json(strategies))
}

/// 전략 활성화 변경.
///
/// 알 수 없는 ID여도 성공으로 응답하고 `STRATEGY_UPDATED`를 에코합니다.
/// PATCH /api/strategies/{id}
pub async fn toggle_strategy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    payload: Result<Json<ToggleStrategyRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;

    match state
        .store
        .set_strategy_enabled(id, request.enabled)
        .await
        .map_err(hub_error_to_response)?
    {
        Some(strategy) => info!(
            strategy_id = id,
            name = %strategy.name,
            enabled = request.enabled,
            "Strategy toggled"
        ),
        None => debug!(strategy_id = id, "Toggle for unknown strategy ignored"),
    }

    state
        .broadcast(HubEvent::strategy_updated(id, request.enabled))
        .await;

    Ok(Json(SuccessResponse { success: true }))
}

/// 전략 라우터 생성.
pub fn strategies_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_strategies))
        .route("/{id}", patch(toggle_strategy))
}
