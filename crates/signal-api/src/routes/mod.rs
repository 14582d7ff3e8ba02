//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/signals` - 신호 조회/등록/결과 확정
//! - `/api/strategies` - 전략 목록/활성화
//! - `/api/metrics` - 시스템 메트릭
//! - `/api/stats` - 당일 통계
//! - `/api/bot` - 봇 시작/중지
//! - `/api/platforms` - 거래 플랫폼 연결
//! - `/ws` - 실시간 이벤트 WebSocket

pub mod bot;
pub mod dashboard;
pub mod health;
pub mod platforms;
pub mod signals;
pub mod strategies;

pub use bot::{bot_router, BotControlResponse};
pub use dashboard::{metrics_router, stats_router};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use platforms::{platforms_router, ConnectPlatformRequest, ConnectPlatformResponse};
pub use signals::{
    signals_router, CreateSignalRequest, ResolveSignalRequest, SuccessResponse,
};
pub use strategies::{strategies_router, ToggleStrategyRequest};

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::state::AppState;
use crate::websocket::websocket_handler;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터와 WebSocket 엔드포인트를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // REST 엔드포인트
        .nest("/api/signals", signals_router())
        .nest("/api/strategies", strategies_router())
        .nest("/api/metrics", metrics_router())
        .nest("/api/stats", stats_router())
        .nest("/api/bot", bot_router())
        .nest("/api/platforms", platforms_router())
        // 실시간 이벤트
        .route("/ws", get(websocket_handler))
}
