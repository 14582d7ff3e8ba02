//! 트레이딩 전략 프로필.
//!
//! 승률은 저장된 값이 아니라 항상 `total_wins / total_trades`에서 다시 계산됩니다.
//! 카운터 필드는 비공개이며 `record_trade`로만 변경됩니다.

use serde::{Deserialize, Serialize};

use super::stats::win_rate;

/// 이름이 있는 전략 프로필과 누적 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// 저장소가 부여한 식별자
    pub id: u64,
    /// 고유 이름
    pub name: String,
    /// 설명
    pub description: String,
    /// 활성화 여부
    pub enabled: bool,
    win_rate: f64,
    total_trades: u64,
    total_wins: u64,
}

impl Strategy {
    /// 거래 기록이 없는 전략을 생성합니다.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        description: impl Into<String>,
        enabled: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            enabled,
            win_rate: 0.0,
            total_trades: 0,
            total_wins: 0,
        }
    }

    /// 누적 거래 기록을 설정합니다.
    ///
    /// `wins`가 `trades`보다 크면 `trades`로 잘립니다.
    pub fn with_record(mut self, trades: u64, wins: u64) -> Self {
        self.total_trades = trades;
        self.total_wins = wins.min(trades);
        self.win_rate = win_rate(self.total_wins, self.total_trades);
        self
    }

    /// 확정된 거래 하나를 기록하고 승률을 다시 계산합니다.
    pub fn record_trade(&mut self, won: bool) {
        self.total_trades += 1;
        if won {
            self.total_wins += 1;
        }
        self.win_rate = win_rate(self.total_wins, self.total_trades);
    }

    /// 승률 (%).
    pub fn win_rate(&self) -> f64 {
        self.win_rate
    }

    /// 총 거래 수.
    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    /// 총 승리 수.
    pub fn total_wins(&self) -> u64 {
        self.total_wins
    }
}
