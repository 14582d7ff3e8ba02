//! 상태 저장소 추상화.
//!
//! 신호, 전략, 시스템 메트릭을 보관하는 저장소 인터페이스입니다.
//! 모든 연산은 하나의 원자적 단계로 수행되어야 하며, 결과 확정 시의
//! 집계 갱신도 같은 임계 구역 안에서 처리됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use signal_core::{
    start_of_local_day, HubResult, MetricsPatch, NewSignal, Signal, SignalOutcome, Strategy,
    SystemMetrics, TodayStats,
};

use crate::aggregator;

// =============================================================================
// 결과 타입
// =============================================================================

/// 결과 확정으로 갱신된 상태 묶음.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// 결과가 기록된 신호
    pub signal: Signal,
    /// 이름이 일치한 전략 (없으면 `None`)
    pub strategy: Option<Strategy>,
    /// 갱신된 시스템 메트릭 (초기화 전이면 `None`)
    pub metrics: Option<SystemMetrics>,
}

/// `set_signal_outcome` 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeUpdate {
    /// 결과가 기록되고 집계가 갱신됨
    Applied(Resolution),
    /// 알 수 없는 신호 ID (상태 변경 없음)
    Unknown,
}

impl OutcomeUpdate {
    /// 결과가 실제로 기록되었는지 확인합니다.
    pub fn is_applied(&self) -> bool {
        matches!(self, OutcomeUpdate::Applied(_))
    }

    /// 기록된 결과를 꺼냅니다.
    pub fn into_resolution(self) -> Option<Resolution> {
        match self {
            OutcomeUpdate::Applied(resolution) => Some(resolution),
            OutcomeUpdate::Unknown => None,
        }
    }
}

// =============================================================================
// SignalStore Trait
// =============================================================================

/// 신호 허브 상태 저장소 trait.
///
/// 알 수 없는 ID에 대한 갱신은 에러가 아니라 상태 변경 없는 성공입니다.
/// 확인이 필요한 호출자는 반환된 `Option`/`OutcomeUpdate`를 검사합니다.
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// 신호를 커밋합니다.
    ///
    /// ID와 타임스탬프를 부여하고 `totalSignals`를 1 증가시킵니다.
    ///
    /// # Errors
    ///
    /// - `HubError::Validation`: 입력값 범위 위반
    async fn create_signal(&self, new: NewSignal) -> HubResult<Signal>;

    /// 최근 신호 목록 (최신순, 기본 개수 제한 적용).
    async fn list_signals(&self, limit: Option<usize>) -> HubResult<Vec<Signal>>;

    /// 주어진 시각 이후 생성된 신호 목록.
    async fn signals_since(&self, since: DateTime<Utc>) -> HubResult<Vec<Signal>>;

    /// 로컬 자정 이후 생성된 신호 목록.
    async fn today_signals(&self) -> HubResult<Vec<Signal>> {
        self.signals_since(start_of_local_day(Utc::now())).await
    }

    /// 신호 결과를 기록하고 전략/시스템 집계를 갱신합니다.
    ///
    /// # Errors
    ///
    /// - `HubError::Validation`: `PENDING`으로 확정 시도, 손익 범위 초과, 누적 손익 오버플로
    /// - `HubError::AlreadyResolved`: 이미 WIN/LOSS로 확정된 신호
    async fn set_signal_outcome(
        &self,
        id: u64,
        outcome: SignalOutcome,
        profit_loss: Decimal,
    ) -> HubResult<OutcomeUpdate>;

    /// 전략 목록 (ID순).
    async fn list_strategies(&self) -> HubResult<Vec<Strategy>>;

    /// 전략 활성화 여부를 변경합니다. 알 수 없는 ID면 `None`.
    async fn set_strategy_enabled(&self, id: u64, enabled: bool) -> HubResult<Option<Strategy>>;

    /// 현재 시스템 메트릭. 초기화 전이면 `None`.
    async fn metrics(&self) -> HubResult<Option<SystemMetrics>>;

    /// 메트릭 부분 갱신. 초기화 전이면 아무것도 하지 않고 `None`.
    async fn merge_metrics(&self, patch: MetricsPatch) -> HubResult<Option<SystemMetrics>>;

    /// 당일 통계.
    async fn today_stats(&self) -> HubResult<TodayStats> {
        let signals = self.today_signals().await?;
        aggregator::today_stats(&signals)
    }
}
