//! 파생 통계 계산.
//!
//! 신호 결과가 확정될 때 저장소의 임계 구역 안에서 호출되는 순수 함수들입니다.
//! 승률은 언제나 카운터에서 다시 계산하며 독립적으로 설정하지 않습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use signal_core::{
    win_rate, HubError, HubResult, MetricsPatch, Signal, Strategy, SystemMetrics, TodayStats,
};

/// 전략에 확정된 거래 하나를 기록합니다.
pub fn record_trade(strategy: &mut Strategy, won: bool) {
    strategy.record_trade(won);
}

/// 확정된 신호 기준 승률 (%). 확정된 신호가 없으면 0.
pub fn daily_win_rate<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> f64 {
    let (wins, resolved) = signals
        .into_iter()
        .fold((0u64, 0u64), |(wins, resolved), signal| {
            if signal.is_win() {
                (wins + 1, resolved + 1)
            } else if signal.is_loss() {
                (wins, resolved + 1)
            } else {
                (wins, resolved)
            }
        });
    win_rate(wins, resolved)
}

/// 손익 합산. 표현 범위를 넘으면 검증 에러.
fn add_profit(total: Decimal, profit_loss: Decimal) -> HubResult<Decimal> {
    total.checked_add(profit_loss).ok_or_else(|| {
        HubError::Validation(format!(
            "profit total overflow: {} + {}",
            total, profit_loss
        ))
    })
}

/// 당일 신호 목록으로 통계를 계산합니다.
///
/// 성공률은 당일 생성된 전체 신호 대비 WIN 비율입니다.
///
/// # Errors
///
/// - `HubError::Validation`: 손익 합계가 표현 범위를 넘음
pub fn today_stats<'a>(signals: impl IntoIterator<Item = &'a Signal>) -> HubResult<TodayStats> {
    let mut stats = TodayStats::default();
    for signal in signals {
        stats.today_signals += 1;
        if signal.is_win() {
            stats.won += 1;
        } else if signal.is_loss() {
            stats.lost += 1;
        }
        stats.total_profit = add_profit(stats.total_profit, signal.profit_loss)?;
    }
    stats.success_rate = win_rate(stats.won as u64, stats.today_signals as u64);
    Ok(stats)
}

/// 결과 확정을 시스템 메트릭에 반영할 패치.
///
/// 누적 손익에 이번 손익을 더하고 당일 승률을 교체합니다.
///
/// # Errors
///
/// - `HubError::Validation`: 누적 손익이 표현 범위를 넘음
pub fn resolution_patch(
    metrics: &SystemMetrics,
    profit_loss: Decimal,
    daily_win_rate: f64,
) -> HubResult<MetricsPatch> {
    Ok(MetricsPatch {
        total_profit: Some(add_profit(metrics.total_profit, profit_loss)?),
        win_rate: Some(daily_win_rate),
        ..Default::default()
    })
}

/// 확정된 신호를 전략 통계와 시스템 메트릭에 반영합니다.
///
/// `today`는 로컬 자정 이후 신호이며 `resolved`의 새 결과를 이미 포함해야 합니다.
/// 메트릭 패치를 먼저 계산하므로, 에러가 나면 전략과 메트릭 모두 변경되지 않습니다.
/// 갱신된 전략(이름이 일치한 경우)과 메트릭의 복사본을 반환합니다.
pub fn apply_resolution<'s, 't>(
    strategies: impl IntoIterator<Item = &'s mut Strategy>,
    metrics: Option<&mut SystemMetrics>,
    today: impl IntoIterator<Item = &'t Signal>,
    resolved: &Signal,
    now: DateTime<Utc>,
) -> HubResult<(Option<Strategy>, Option<SystemMetrics>)> {
    let patch = metrics
        .as_deref()
        .map(|metrics| resolution_patch(metrics, resolved.profit_loss, daily_win_rate(today)))
        .transpose()?;

    let strategy = strategies
        .into_iter()
        .find(|s| s.name == resolved.strategy)
        .map(|strategy| {
            record_trade(strategy, resolved.is_win());
            strategy.clone()
        });

    let metrics = metrics.zip(patch).map(|(metrics, patch)| {
        metrics.apply(&patch, now);
        metrics.clone()
    });

    Ok((strategy, metrics))
}
