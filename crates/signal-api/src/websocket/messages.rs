//! WebSocket 이벤트 타입.
//!
//! 서버에서 클라이언트로 전달되는 이벤트 정의. 모든 이벤트는
//! `{"type": TAG, "data": payload}` 형태로 직렬화됩니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use signal_core::{
    BotStatus, HubError, PlatformInfo, Signal, SignalOutcome, SystemMetrics,
};

/// WebSocket 에러.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("직렬화 실패: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("메일박스가 닫힘: {0}")]
    MailboxClosed(Uuid),
}

impl From<WsError> for HubError {
    fn from(err: WsError) -> Self {
        match err {
            WsError::SerializationError(e) => HubError::Serialization(e.to_string()),
            other => HubError::Transport(other.to_string()),
        }
    }
}

// ==================== 서버 → 클라이언트 이벤트 ====================

/// 브로드캐스트 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HubEvent {
    /// 연결 확인 (연결 직후 해당 연결에만 전송)
    ConnectionConfirmed(ConnectionConfirmedData),
    /// 새 신호 커밋
    NewSignal(Signal),
    /// 신호 결과 갱신
    SignalUpdated(SignalUpdateData),
    /// 전략 활성화 변경
    StrategyUpdated(StrategyToggleData),
    /// 봇 상태 변경
    BotStatusChanged(BotStatusData),
    /// 플랫폼 연결
    PlatformConnected(PlatformInfo),
    /// 시스템 메트릭 갱신
    MetricsUpdated(SystemMetrics),
}

/// 연결 확인 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfirmedData {
    /// 서버 시각
    pub timestamp: DateTime<Utc>,
}

/// 신호 결과 갱신 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalUpdateData {
    pub id: u64,
    pub result: SignalOutcome,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_loss: Decimal,
}

/// 전략 활성화 변경 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyToggleData {
    pub id: u64,
    pub enabled: bool,
}

/// 봇 상태 데이터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStatusData {
    pub status: BotStatus,
}

impl HubEvent {
    /// 현재 시각으로 연결 확인 이벤트 생성.
    pub fn connection_confirmed() -> Self {
        HubEvent::ConnectionConfirmed(ConnectionConfirmedData {
            timestamp: Utc::now(),
        })
    }

    /// 신호 결과 갱신 이벤트 생성.
    pub fn signal_updated(id: u64, result: SignalOutcome, profit_loss: Decimal) -> Self {
        HubEvent::SignalUpdated(SignalUpdateData {
            id,
            result,
            profit_loss,
        })
    }

    /// 전략 활성화 변경 이벤트 생성.
    pub fn strategy_updated(id: u64, enabled: bool) -> Self {
        HubEvent::StrategyUpdated(StrategyToggleData { id, enabled })
    }

    /// 봇 상태 변경 이벤트 생성.
    pub fn bot_status_changed(status: BotStatus) -> Self {
        HubEvent::BotStatusChanged(BotStatusData { status })
    }

    /// 이벤트 태그 (로깅용).
    pub fn event_type(&self) -> &'static str {
        match self {
            HubEvent::ConnectionConfirmed(_) => "CONNECTION_CONFIRMED",
            HubEvent::NewSignal(_) => "NEW_SIGNAL",
            HubEvent::SignalUpdated(_) => "SIGNAL_UPDATED",
            HubEvent::StrategyUpdated(_) => "STRATEGY_UPDATED",
            HubEvent::BotStatusChanged(_) => "BOT_STATUS_CHANGED",
            HubEvent::PlatformConnected(_) => "PLATFORM_CONNECTED",
            HubEvent::MetricsUpdated(_) => "METRICS_UPDATED",
        }
    }

    /// JSON 문자열로 직렬화.
    pub fn to_json(&self) -> Result<String, WsError> {
        serde_json::to_string(self).map_err(WsError::from)
    }

    /// JSON 문자열에서 파싱.
    pub fn from_json(json: &str) -> Result<Self, WsError> {
        serde_json::from_str(json).map_err(WsError::from)
    }
}
