//! 데모 시드 데이터.
//!
//! 고정 전략 카탈로그와 선택적 샘플 신호, 미리 채운 메트릭 값을 제공합니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use signal_core::{Direction, NewSignal, SignalOutcome};

/// 카탈로그 전략 항목.
#[derive(Debug, Clone, Copy)]
pub struct StrategySeed {
    pub name: &'static str,
    pub description: &'static str,
    pub enabled: bool,
    pub total_trades: u64,
    pub total_wins: u64,
}

const fn seed(
    name: &'static str,
    description: &'static str,
    enabled: bool,
    total_trades: u64,
    total_wins: u64,
) -> StrategySeed {
    StrategySeed {
        name,
        description,
        enabled,
        total_trades,
        total_wins,
    }
}

/// 고정 전략 카탈로그.
pub const STRATEGY_CATALOG: &[StrategySeed] = &[
    seed("Triple Confirmation", "Volume + Price action + S/R confluence", true, 23, 23),
    seed("Fibonacci Golden Ratio", "61.8% & 38.2% precision entries", true, 31, 30),
    seed("Multi-Timeframe MACD", "Cross-timeframe momentum analysis", true, 42, 40),
    seed("Smart Money Concepts", "Institutional order flow detection", true, 19, 19),
    seed("Super Bullish Candle", "Open=Low, Close=High pattern", true, 45, 45),
    seed("Super Bearish Candle", "Open=High, Close=Low pattern", true, 52, 51),
    seed("Heikin Ashi Trend Flip", "Color change + wick analysis", true, 67, 63),
    seed("RSI + EMA Confluence", "Oversold/Overbought with trend", false, 38, 34),
    seed("Volume Spike Hammer", "High volume + reversal pattern", true, 29, 28),
];

/// 데모 메트릭 누적 손익.
pub const DEMO_TOTAL_PROFIT: Decimal = dec!(2847.50);
/// 데모 메트릭 누적 신호 수.
pub const DEMO_TOTAL_SIGNALS: u64 = 231;
/// 데모 메트릭 승률 (%).
pub const DEMO_WIN_RATE: f64 = 87.3;

/// 이미 실행되고 결과가 확정된 샘플 신호.
#[derive(Debug, Clone)]
pub struct SignalSeed {
    pub signal: NewSignal,
    pub timestamp: DateTime<Utc>,
    pub outcome: SignalOutcome,
    pub profit_loss: Decimal,
}

/// 샘플 신호 두 개를 `now` 기준 시각으로 생성합니다.
pub fn demo_signals(now: DateTime<Utc>) -> Vec<SignalSeed> {
    vec![
        SignalSeed {
            signal: NewSignal::new("EUR/USD", Direction::Buy, "Super Bullish Candle", 98.0, 5)
                .with_notes("Hammer + Volume", "Bounce at 1.0850"),
            timestamp: now,
            outcome: SignalOutcome::Win,
            profit_loss: dec!(85.00),
        },
        SignalSeed {
            signal: NewSignal::new("GBP/JPY", Direction::Sell, "Super Bearish Candle", 95.0, 3)
                .with_notes("Shooting Star", "Reject at 185.20"),
            timestamp: now - Duration::minutes(5),
            outcome: SignalOutcome::Win,
            profit_loss: dec!(92.50),
        },
    ]
}
