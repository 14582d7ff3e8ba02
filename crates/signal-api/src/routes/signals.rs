//! 트레이딩 신호 API 라우트.
//!
//! 최근 신호 조회, 신호 등록, 결과 확정을 처리하고 변경 사항을 브로드캐스트합니다.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use signal_core::{Direction, NewSignal, Signal, SignalOutcome, MAX_ABS_PROFIT_LOSS};
use signal_store::OutcomeUpdate;

use crate::error::{
    hub_error_to_response, json_rejection_to_response, validation_errors_to_response, ApiResult,
};
use crate::state::AppState;
use crate::websocket::HubEvent;

// ==================== 커스텀 검증 함수 ====================

/// 손익 검증 (±10억)
fn validate_profit_loss_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.abs() > MAX_ABS_PROFIT_LOSS {
        return Err(ValidationError::new("profit_loss_out_of_range")
            .with_message("profitLoss는 ±10억 범위여야 합니다".into()));
    }
    Ok(())
}

// ==================== Request/Response 타입 ====================

/// 신호 목록 조회 쿼리.
#[derive(Debug, Deserialize)]
pub struct ListSignalsQuery {
    /// 최대 개수 (생략 시 저장소 기본값)
    pub limit: Option<usize>,
}

/// 신호 등록 요청.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSignalRequest {
    /// 통화쌍 (예: "EUR/USD")
    #[validate(length(min = 1, max = 20, message = "pair는 1-20자여야 합니다"))]
    pub pair: String,
    /// 방향 (BUY | SELL)
    pub signal: Direction,
    /// 전략 이름
    #[validate(length(min = 1, max = 100, message = "strategy는 1-100자여야 합니다"))]
    pub strategy: String,
    /// 신뢰도 (0 ~ 100)
    #[validate(range(min = 0.0, max = 100.0, message = "confidence는 0-100 범위여야 합니다"))]
    pub confidence: f64,
    /// 유지 시간 (분)
    #[validate(range(min = 1, message = "duration은 1분 이상이어야 합니다"))]
    pub duration: u32,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub support_resistance: Option<String>,
}

impl From<CreateSignalRequest> for NewSignal {
    fn from(request: CreateSignalRequest) -> Self {
        let mut new = NewSignal::new(
            request.pair,
            request.signal,
            request.strategy,
            request.confidence,
            request.duration,
        );
        new.pattern = request.pattern;
        new.support_resistance = request.support_resistance;
        new
    }
}

/// 신호 결과 확정 요청.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveSignalRequest {
    /// 결과 (WIN | LOSS)
    pub result: SignalOutcome,
    /// 손익
    #[serde(default, with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_profit_loss_range"))]
    pub profit_loss: Decimal,
}

/// 단순 성공 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// ==================== Handler ====================

/// 최근 신호 목록.
///
/// GET /api/signals?limit=N
pub async fn list_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListSignalsQuery>,
) -> ApiResult<Json<Vec<Signal>>> {
    let signals = state
        .store
        .list_signals(query.limit)
        .await
        .map_err(hub_error_to_response)?;
    Ok(Json(signals))
}

/// 신호 등록.
///
/// 커밋된 신호와 갱신된 메트릭을 브로드캐스트합니다.
/// POST /api/signals
pub async fn create_signal(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateSignalRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Signal>)> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;
    request.validate().map_err(validation_errors_to_response)?;

    let signal = state
        .store
        .create_signal(request.into())
        .await
        .map_err(hub_error_to_response)?;
    info!(signal_id = signal.id, pair = %signal.pair, "Signal submitted");

    state.broadcast(HubEvent::NewSignal(signal.clone())).await;
    if let Some(metrics) = state.store.metrics().await.map_err(hub_error_to_response)? {
        state.broadcast(HubEvent::MetricsUpdated(metrics)).await;
    }

    Ok((StatusCode::CREATED, Json(signal)))
}

/// 신호 결과 확정.
///
/// 알 수 없는 ID는 상태 변경 없이 성공으로 응답하며 `SIGNAL_UPDATED`만 에코합니다.
/// 이미 확정된 신호는 409를 반환합니다.
/// PATCH /api/signals/{id}/result
pub async fn resolve_signal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    payload: Result<Json<ResolveSignalRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse>> {
    let Json(request) = payload.map_err(json_rejection_to_response)?;
    request.validate().map_err(validation_errors_to_response)?;

    let update = state
        .store
        .set_signal_outcome(id, request.result, request.profit_loss)
        .await
        .map_err(hub_error_to_response)?;

    state
        .broadcast(HubEvent::signal_updated(id, request.result, request.profit_loss))
        .await;

    match update {
        OutcomeUpdate::Applied(resolution) => {
            info!(
                signal_id = id,
                result = %request.result,
                profit_loss = %request.profit_loss,
                "Signal resolved"
            );
            if let Some(metrics) = resolution.metrics {
                state.broadcast(HubEvent::MetricsUpdated(metrics)).await;
            }
        }
        OutcomeUpdate::Unknown => {
            debug!(signal_id = id, "Resolution for unknown signal ignored");
        }
    }

    Ok(Json(SuccessResponse { success: true }))
}

/// 신호 라우터 생성.
pub fn signals_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_signals).post(create_signal))
        .route("/{id}/result", patch(resolve_signal))
}
