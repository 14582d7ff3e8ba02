//! 통계 계산 공용 함수와 당일 통계 타입.

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 승률 (%) 계산.
///
/// 거래가 없으면 0을 반환합니다.
pub fn win_rate(wins: u64, trades: u64) -> f64 {
    if trades == 0 {
        return 0.0;
    }
    wins as f64 / trades as f64 * 100.0
}

/// 주어진 시각이 속한 로컬 날짜의 자정(UTC 표현).
///
/// DST 전환으로 자정이 존재하지 않는 날은 입력 시각을 그대로 반환합니다.
pub fn start_of_local_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_timezone(&Local)
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// 당일 성과 통계.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    /// 당일 생성된 신호 수
    pub today_signals: usize,
    /// 수익 확정 수
    pub won: usize,
    /// 손실 확정 수
    pub lost: usize,
    /// 당일 전체 신호 대비 WIN 비율 (%)
    pub success_rate: f64,
    /// 당일 손익 합계
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit: Decimal,
}
