//! 트레이딩 신호.
//!
//! - `Direction` - 매수/매도 방향
//! - `SignalOutcome` - 신호 결과 (WIN/LOSS/PENDING)
//! - `NewSignal` - 커밋 전 신호 입력값
//! - `Signal` - 저장소가 식별자와 타임스탬프를 부여한 신호

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};

/// 신호 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            _ => Err(HubError::Validation(format!("unknown direction: {}", s))),
        }
    }
}

/// 신호 하나에 기록할 수 있는 손익의 절댓값 상한 (10억).
pub const MAX_ABS_PROFIT_LOSS: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// 기록할 손익이 허용 범위 안인지 검증합니다.
///
/// # Errors
///
/// - `HubError::Validation`: 절댓값이 `MAX_ABS_PROFIT_LOSS` 초과
pub fn validate_profit_loss(profit_loss: Decimal) -> HubResult<()> {
    if profit_loss.abs() > MAX_ABS_PROFIT_LOSS {
        return Err(HubError::Validation(format!(
            "profitLoss must be within ±{}, got {}",
            MAX_ABS_PROFIT_LOSS, profit_loss
        )));
    }
    Ok(())
}

/// 신호 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalOutcome {
    /// 수익
    Win,
    /// 손실
    Loss,
    /// 결과 대기
    Pending,
}

impl SignalOutcome {
    /// 확정된 결과(WIN/LOSS)인지 확인합니다.
    pub fn is_resolved(&self) -> bool {
        matches!(self, SignalOutcome::Win | SignalOutcome::Loss)
    }
}

impl std::fmt::Display for SignalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalOutcome::Win => write!(f, "WIN"),
            SignalOutcome::Loss => write!(f, "LOSS"),
            SignalOutcome::Pending => write!(f, "PENDING"),
        }
    }
}

impl std::str::FromStr for SignalOutcome {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "WIN" => Ok(SignalOutcome::Win),
            "LOSS" => Ok(SignalOutcome::Loss),
            "PENDING" => Ok(SignalOutcome::Pending),
            _ => Err(HubError::Validation(format!("unknown outcome: {}", s))),
        }
    }
}

/// 커밋 전 신호 입력값.
///
/// 생성기 또는 요청 계층이 만들며, 저장소가 커밋할 때 식별자와 타임스탬프가 부여됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSignal {
    /// 통화쌍 (예: "EUR/USD")
    pub pair: String,
    /// 방향
    #[serde(rename = "signal")]
    pub direction: Direction,
    /// 전략 이름
    pub strategy: String,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 유지 시간 (분)
    pub duration: u32,
    /// 감지된 패턴
    #[serde(default)]
    pub pattern: Option<String>,
    /// 지지/저항 메모
    #[serde(default)]
    pub support_resistance: Option<String>,
}

impl NewSignal {
    /// 새 입력값을 생성합니다.
    pub fn new(
        pair: impl Into<String>,
        direction: Direction,
        strategy: impl Into<String>,
        confidence: f64,
        duration: u32,
    ) -> Self {
        Self {
            pair: pair.into(),
            direction,
            strategy: strategy.into(),
            confidence,
            duration,
            pattern: None,
            support_resistance: None,
        }
    }

    /// 패턴과 지지/저항 메모를 설정합니다.
    pub fn with_notes(
        mut self,
        pattern: impl Into<String>,
        support_resistance: impl Into<String>,
    ) -> Self {
        self.pattern = Some(pattern.into());
        self.support_resistance = Some(support_resistance.into());
        self
    }

    /// 필드 값을 검증합니다.
    pub fn validate(&self) -> HubResult<()> {
        if self.pair.trim().is_empty() {
            return Err(HubError::Validation("pair must not be empty".to_string()));
        }
        if self.strategy.trim().is_empty() {
            return Err(HubError::Validation("strategy must not be empty".to_string()));
        }
        if !self.confidence.is_finite() || !(0.0..=100.0).contains(&self.confidence) {
            return Err(HubError::Validation(format!(
                "confidence must be within [0, 100], got {}",
                self.confidence
            )));
        }
        if self.duration == 0 {
            return Err(HubError::Validation(
                "duration must be at least 1 minute".to_string(),
            ));
        }
        Ok(())
    }
}

/// 커밋된 트레이딩 신호.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// 저장소가 부여한 식별자
    pub id: u64,
    /// 통화쌍
    pub pair: String,
    /// 방향
    #[serde(rename = "signal")]
    pub direction: Direction,
    /// 전략 이름
    pub strategy: String,
    /// 신뢰도 (0 ~ 100)
    pub confidence: f64,
    /// 생성 시각
    pub timestamp: DateTime<Utc>,
    /// 유지 시간 (분)
    pub duration: u32,
    /// 감지된 패턴
    pub pattern: Option<String>,
    /// 지지/저항 메모
    pub support_resistance: Option<String>,
    /// 실행 여부
    pub executed: bool,
    /// 결과 (미확정이면 `None`)
    #[serde(rename = "result")]
    pub outcome: Option<SignalOutcome>,
    /// 손익
    #[serde(with = "rust_decimal::serde::float")]
    pub profit_loss: Decimal,
}

impl Signal {
    /// 입력값을 커밋된 신호로 변환합니다.
    ///
    /// 빈 문자열 메모는 `None`으로 정규화됩니다.
    pub fn commit(id: u64, timestamp: DateTime<Utc>, new: NewSignal) -> Self {
        Self {
            id,
            pair: new.pair,
            direction: new.direction,
            strategy: new.strategy,
            confidence: new.confidence,
            timestamp,
            duration: new.duration,
            pattern: new.pattern.filter(|p| !p.is_empty()),
            support_resistance: new.support_resistance.filter(|s| !s.is_empty()),
            executed: false,
            outcome: None,
            profit_loss: Decimal::ZERO,
        }
    }

    /// 결과가 확정되었는지 확인합니다.
    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some_and(|o| o.is_resolved())
    }

    /// 수익으로 확정된 신호인지 확인합니다.
    pub fn is_win(&self) -> bool {
        self.outcome == Some(SignalOutcome::Win)
    }

    /// 손실로 확정된 신호인지 확인합니다.
    pub fn is_loss(&self) -> bool {
        self.outcome == Some(SignalOutcome::Loss)
    }
}
