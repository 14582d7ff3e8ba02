//! 실시간 신호 팬아웃을 위한 WebSocket 서버.
//!
//! 클라이언트는 `/ws`로 연결하면 `CONNECTION_CONFIRMED`를 받은 뒤
//! 모든 브로드캐스트 이벤트를 수신합니다. 구독 채널은 없습니다.
//!
//! # 메시지 형식
//!
//! ## 서버 → 클라이언트
//!
//! ```json
//! {"type": "CONNECTION_CONFIRMED", "data": {"timestamp": "..."}}
//! {"type": "NEW_SIGNAL", "data": {...}}
//! {"type": "SIGNAL_UPDATED", "data": {"id": 1, "result": "WIN", "profitLoss": 85.0}}
//! {"type": "METRICS_UPDATED", "data": {...}}
//! ```
//!
//! 클라이언트가 보내는 텍스트 메시지는 무시됩니다.

pub mod handler;
pub mod liveness;
pub mod messages;
pub mod producer;
pub mod registry;

pub use handler::websocket_handler;
pub use liveness::{start_liveness_monitor, LivenessMonitor};
pub use messages::{
    BotStatusData, ConnectionConfirmedData, HubEvent, SignalUpdateData, StrategyToggleData,
    WsError,
};
pub use producer::{start_producer, CycleOutcome, SignalProducer};
pub use registry::{
    create_registry, BroadcastReport, ConnectionId, ConnectionRegistry,
    Outbound, ProbeReport, SharedRegistry,
};
