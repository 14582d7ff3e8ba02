//! REST API 및 WebSocket 팬아웃 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - 실시간 신호 팬아웃을 위한 WebSocket 서버
//! - 데모 신호 생성기와 연결 생존 확인 백그라운드 태스크
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`websocket`]: 연결 레지스트리, 브로드캐스터, 생성기, 생존 확인
//! - [`tasks`]: 백그라운드 태스크 수명 관리
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod error;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod websocket;

pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use state::AppState;
pub use tasks::BackgroundTasks;
pub use websocket::{
    create_registry, websocket_handler, BroadcastReport, ConnectionRegistry, HubEvent,
    SharedRegistry, WsError,
};

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
