//! 인메모리 상태 저장소.
//!
//! 전체 상태를 하나의 `RwLock`으로 보호합니다. 신호 커밋과 `totalSignals` 증가,
//! 결과 확정과 집계 갱신은 각각 같은 쓰기 잠금 안에서 수행됩니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, info};

use signal_core::{
    start_of_local_day, validate_profit_loss, HubError, HubResult, MetricsPatch, NewSignal,
    Signal, SignalOutcome, StoreConfig, Strategy, SystemMetrics,
};

use crate::aggregator;
use crate::catalog::{self, STRATEGY_CATALOG};
use crate::store::{OutcomeUpdate, Resolution, SignalStore};

/// 잠금으로 보호되는 저장소 상태.
#[derive(Debug)]
struct StoreState {
    /// 모든 엔티티가 공유하는 ID 카운터
    next_id: u64,
    signals: BTreeMap<u64, Signal>,
    strategies: BTreeMap<u64, Strategy>,
    metrics: Option<SystemMetrics>,
}

impl StoreState {
    fn new() -> Self {
        Self {
            next_id: 1,
            signals: BTreeMap::new(),
            strategies: BTreeMap::new(),
            metrics: None,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn commit_signal(&mut self, new: NewSignal, timestamp: DateTime<Utc>) -> Signal {
        let id = self.allocate_id();
        let signal = Signal::commit(id, timestamp, new);
        self.signals.insert(id, signal.clone());
        signal
    }

    fn add_strategy(
        &mut self,
        name: &str,
        description: &str,
        enabled: bool,
    ) -> HubResult<&mut Strategy> {
        if self.strategies.values().any(|s| s.name == name) {
            return Err(HubError::Validation(format!(
                "duplicate strategy name: {}",
                name
            )));
        }
        let id = self.allocate_id();
        Ok(self
            .strategies
            .entry(id)
            .or_insert_with(|| Strategy::new(id, name, description, enabled)))
    }

    fn signals_since(&self, since: DateTime<Utc>) -> impl Iterator<Item = &Signal> {
        self.signals.values().filter(move |s| s.timestamp >= since)
    }

    fn seed_catalog(&mut self) -> HubResult<()> {
        for seed in STRATEGY_CATALOG {
            let strategy = self.add_strategy(seed.name, seed.description, seed.enabled)?;
            *strategy = strategy
                .clone()
                .with_record(seed.total_trades, seed.total_wins);
        }
        Ok(())
    }

    fn seed_demo(&mut self, now: DateTime<Utc>) -> HubResult<()> {
        if let Some(metrics) = self.metrics.as_mut() {
            metrics.total_profit = catalog::DEMO_TOTAL_PROFIT;
            metrics.total_signals = catalog::DEMO_TOTAL_SIGNALS;
            metrics.win_rate = catalog::DEMO_WIN_RATE;
        }
        for seed in catalog::demo_signals(now) {
            seed.signal.validate()?;
            let id = self.commit_signal(seed.signal, seed.timestamp).id;
            if let Some(signal) = self.signals.get_mut(&id) {
                signal.executed = true;
                signal.outcome = Some(seed.outcome);
                signal.profit_loss = seed.profit_loss;
            }
        }
        Ok(())
    }
}

/// `SignalStore`의 인메모리 구현.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    default_limit: usize,
}

impl MemoryStore {
    /// 빈 저장소를 생성합니다. 메트릭은 초기화되지 않은 상태입니다.
    pub fn new(default_limit: usize) -> Self {
        Self {
            state: RwLock::new(StoreState::new()),
            default_limit: default_limit.max(1),
        }
    }

    /// 설정에 따라 전략 카탈로그와 메트릭을 시드한 저장소를 생성합니다.
    ///
    /// `seed_demo_data`가 켜져 있으면 샘플 신호와 데모 메트릭 값도 채웁니다.
    pub fn from_config(config: &StoreConfig) -> HubResult<Self> {
        let now = Utc::now();
        let mut state = StoreState::new();
        state.seed_catalog()?;
        state.metrics = Some(SystemMetrics::new(config.default_platform.clone(), now));
        if config.seed_demo_data {
            state.seed_demo(now)?;
        }

        info!(
            strategies = state.strategies.len(),
            signals = state.signals.len(),
            platform = %config.default_platform,
            demo = config.seed_demo_data,
            "Memory store seeded"
        );

        Ok(Self {
            state: RwLock::new(state),
            default_limit: config.default_signal_limit.max(1),
        })
    }

    /// 메트릭을 초기화합니다. 이미 초기화되었으면 기존 값을 반환합니다.
    pub async fn initialize_metrics(&self, platform: impl Into<String>) -> SystemMetrics {
        let mut state = self.state.write().await;
        state
            .metrics
            .get_or_insert_with(|| SystemMetrics::new(platform, Utc::now()))
            .clone()
    }

    /// 전략을 추가합니다.
    ///
    /// # Errors
    ///
    /// - `HubError::Validation`: 같은 이름의 전략이 이미 있음
    pub async fn add_strategy(
        &self,
        name: &str,
        description: &str,
        enabled: bool,
    ) -> HubResult<Strategy> {
        let mut state = self.state.write().await;
        state
            .add_strategy(name, description, enabled)
            .map(|s| s.clone())
    }

    /// 지정한 타임스탬프로 신호를 커밋합니다 (백필용).
    pub async fn create_signal_at(
        &self,
        new: NewSignal,
        timestamp: DateTime<Utc>,
    ) -> HubResult<Signal> {
        new.validate()?;

        let mut state = self.state.write().await;
        let signal = state.commit_signal(new, timestamp);
        if let Some(metrics) = state.metrics.as_mut() {
            metrics.total_signals += 1;
            metrics.last_updated = Utc::now();
        }

        debug!(id = signal.id, pair = %signal.pair, strategy = %signal.strategy, "Signal committed");
        Ok(signal)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default().default_signal_limit)
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn create_signal(&self, new: NewSignal) -> HubResult<Signal> {
        self.create_signal_at(new, Utc::now()).await
    }

    async fn list_signals(&self, limit: Option<usize>) -> HubResult<Vec<Signal>> {
        let limit = limit.unwrap_or(self.default_limit);
        let state = self.state.read().await;

        let mut signals: Vec<Signal> = state.signals.values().cloned().collect();
        signals.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        signals.truncate(limit);
        Ok(signals)
    }

    async fn signals_since(&self, since: DateTime<Utc>) -> HubResult<Vec<Signal>> {
        let state = self.state.read().await;
        Ok(state.signals_since(since).cloned().collect())
    }

    async fn set_signal_outcome(
        &self,
        id: u64,
        outcome: SignalOutcome,
        profit_loss: Decimal,
    ) -> HubResult<OutcomeUpdate> {
        if !outcome.is_resolved() {
            return Err(HubError::Validation(format!(
                "outcome must be WIN or LOSS, got {}",
                outcome
            )));
        }

        validate_profit_loss(profit_loss)?;

        let now = Utc::now();
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some(current) = state.signals.get(&id) else {
            debug!(id, "Outcome for unknown signal ignored");
            return Ok(OutcomeUpdate::Unknown);
        };
        if current.is_resolved() {
            return Err(HubError::AlreadyResolved(id));
        }
        let mut signal = current.clone();
        signal.outcome = Some(outcome);
        signal.profit_loss = profit_loss;

        // 집계가 실패하면 신호도 갱신하지 않음
        let midnight = start_of_local_day(now);
        let today = state
            .signals
            .values()
            .filter(|s| s.timestamp >= midnight)
            .map(|s| if s.id == id { &signal } else { s });
        let (strategy, metrics) = aggregator::apply_resolution(
            state.strategies.values_mut(),
            state.metrics.as_mut(),
            today,
            &signal,
            now,
        )?;
        state.signals.insert(id, signal.clone());

        info!(
            id,
            outcome = %outcome,
            profit_loss = %profit_loss,
            strategy = %signal.strategy,
            "Signal resolved"
        );

        Ok(OutcomeUpdate::Applied(Resolution {
            signal,
            strategy,
            metrics,
        }))
    }

    async fn list_strategies(&self) -> HubResult<Vec<Strategy>> {
        let state = self.state.read().await;
        Ok(state.strategies.values().cloned().collect())
    }

    async fn set_strategy_enabled(&self, id: u64, enabled: bool) -> HubResult<Option<Strategy>> {
        let mut state = self.state.write().await;
        let updated = state.strategies.get_mut(&id).map(|strategy| {
            strategy.enabled = enabled;
            strategy.clone()
        });
        if updated.is_none() {
            debug!(id, "Toggle for unknown strategy ignored");
        }
        Ok(updated)
    }

    async fn metrics(&self) -> HubResult<Option<SystemMetrics>> {
        let state = self.state.read().await;
        Ok(state.metrics.clone())
    }

    async fn merge_metrics(&self, patch: MetricsPatch) -> HubResult<Option<SystemMetrics>> {
        let mut state = self.state.write().await;
        Ok(state.metrics.as_mut().map(|metrics| {
            metrics.apply(&patch, Utc::now());
            metrics.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use signal_core::Direction;

    fn seeded() -> MemoryStore {
        MemoryStore::from_config(&StoreConfig {
            seed_demo_data: false,
            ..Default::default()
        })
        .unwrap()
    }

    fn new_signal(strategy: &str) -> NewSignal {
        NewSignal::new("EUR/USD", Direction::Buy, strategy, 90.0, 3)
    }

    #[tokio::test]
    async fn test_catalog_seeded_with_ids() {
        let store = seeded();
        let strategies = store.list_strategies().await.unwrap();

        assert_eq!(strategies.len(), 9);
        let ids: Vec<u64> = strategies.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
        assert_eq!(strategies[0].name, "Triple Confirmation");
        assert_eq!(strategies[0].win_rate(), 100.0);
    }

    #[tokio::test]
    async fn test_create_signal_defaults() {
        let store = seeded();
        let before = Utc::now();
        let signal = store.create_signal(new_signal("Super Bullish Candle")).await.unwrap();

        assert_eq!(signal.id, 10);
        assert!(!signal.executed);
        assert!(signal.outcome.is_none());
        assert_eq!(signal.profit_loss, Decimal::ZERO);
        assert!(signal.timestamp >= before);
        assert!(Utc::now() - signal.timestamp < Duration::seconds(5));

        let metrics = store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.total_signals, 1);
    }

    #[tokio::test]
    async fn test_create_signal_rejects_invalid() {
        let store = seeded();
        let mut bad = new_signal("X");
        bad.confidence = 120.0;

        let err = store.create_signal(bad).await.unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
        assert_eq!(store.metrics().await.unwrap().unwrap().total_signals, 0);
        assert!(store.list_signals(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_signals_order_and_limit() {
        let store = seeded();
        let now = Utc::now();
        let old = store
            .create_signal_at(new_signal("A"), now - Duration::hours(1))
            .await
            .unwrap();
        let tie_a = store.create_signal_at(new_signal("B"), now).await.unwrap();
        let tie_b = store.create_signal_at(new_signal("C"), now).await.unwrap();

        let listed = store.list_signals(None).await.unwrap();
        let ids: Vec<u64> = listed.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![tie_b.id, tie_a.id, old.id]);

        let limited = store.list_signals(Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, tie_b.id);
    }

    #[tokio::test]
    async fn test_default_limit_applied() {
        let store = MemoryStore::new(2);
        for _ in 0..5 {
            store.create_signal(new_signal("A")).await.unwrap();
        }
        assert_eq!(store.list_signals(None).await.unwrap().len(), 2);
        assert_eq!(store.list_signals(Some(10)).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_signals_since() {
        let store = seeded();
        let now = Utc::now();
        store
            .create_signal_at(new_signal("A"), now - Duration::days(2))
            .await
            .unwrap();
        let recent = store.create_signal(new_signal("B")).await.unwrap();

        let since = store.signals_since(now - Duration::minutes(1)).await.unwrap();
        assert_eq!(since.len(), 1);
        assert_eq!(since[0].id, recent.id);
    }

    #[tokio::test]
    async fn test_resolve_win_updates_strategy_and_metrics() {
        let store = seeded();
        let signal = store
            .create_signal(new_signal("Super Bearish Candle"))
            .await
            .unwrap();

        let update = store
            .set_signal_outcome(signal.id, SignalOutcome::Win, dec!(40.25))
            .await
            .unwrap();
        let resolution = update.into_resolution().unwrap();

        assert_eq!(resolution.signal.outcome, Some(SignalOutcome::Win));
        assert_eq!(resolution.signal.profit_loss, dec!(40.25));
        assert!(!resolution.signal.executed);

        let strategy = resolution.strategy.unwrap();
        assert_eq!(strategy.total_trades(), 53);
        assert_eq!(strategy.total_wins(), 52);

        let metrics = resolution.metrics.unwrap();
        assert_eq!(metrics.total_profit, dec!(40.25));
        assert_eq!(metrics.win_rate, 100.0);
    }

    #[tokio::test]
    async fn test_resolve_loss_keeps_wins() {
        let store = seeded();
        let signal = store.create_signal(new_signal("Triple Confirmation")).await.unwrap();

        let resolution = store
            .set_signal_outcome(signal.id, SignalOutcome::Loss, dec!(-10))
            .await
            .unwrap()
            .into_resolution()
            .unwrap();

        let strategy = resolution.strategy.unwrap();
        assert_eq!(strategy.total_trades(), 24);
        assert_eq!(strategy.total_wins(), 23);
        assert_eq!(resolution.metrics.unwrap().win_rate, 0.0);
    }

    #[tokio::test]
    async fn test_double_resolution_rejected() {
        let store = seeded();
        let signal = store.create_signal(new_signal("Triple Confirmation")).await.unwrap();
        store
            .set_signal_outcome(signal.id, SignalOutcome::Win, dec!(5))
            .await
            .unwrap();

        let err = store
            .set_signal_outcome(signal.id, SignalOutcome::Loss, dec!(-5))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::AlreadyResolved(id) if id == signal.id));

        let strategies = store.list_strategies().await.unwrap();
        let strategy = strategies.iter().find(|s| s.name == "Triple Confirmation").unwrap();
        assert_eq!(strategy.total_trades(), 24);
        assert_eq!(strategy.total_wins(), 24);
        assert_eq!(store.metrics().await.unwrap().unwrap().total_profit, dec!(5));
    }

    #[tokio::test]
    async fn test_resolve_pending_rejected() {
        let store = seeded();
        let signal = store.create_signal(new_signal("A")).await.unwrap();
        let err = store
            .set_signal_outcome(signal.id, SignalOutcome::Pending, Decimal::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
    }

    async fn hammer_trades(store: &MemoryStore) -> u64 {
        store
            .list_strategies()
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.name == "Volume Spike Hammer")
            .map(|s| s.total_trades())
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolve_out_of_range_profit_rejected() {
        let store = seeded();
        let a = store.create_signal(new_signal("Volume Spike Hammer")).await.unwrap();
        let b = store.create_signal(new_signal("Volume Spike Hammer")).await.unwrap();
        let huge = Decimal::from_str_exact("70000000000000000000000000000").unwrap();

        for id in [a.id, b.id] {
            let err = store
                .set_signal_outcome(id, SignalOutcome::Win, huge)
                .await
                .unwrap_err();
            assert!(matches!(err, HubError::Validation(_)));
        }

        assert_eq!(hammer_trades(&store).await, 29);
        let signals = store.list_signals(None).await.unwrap();
        assert!(signals.iter().all(|s| s.outcome.is_none()));
        let stats = store.today_stats().await.unwrap();
        assert_eq!(stats.total_profit, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_resolve_overflow_leaves_state_untouched() {
        let store = seeded();
        let signal = store.create_signal(new_signal("Volume Spike Hammer")).await.unwrap();
        store
            .merge_metrics(MetricsPatch {
                total_profit: Some(Decimal::MAX),
                ..Default::default()
            })
            .await
            .unwrap();
        let before = store.metrics().await.unwrap();

        let err = store
            .set_signal_outcome(signal.id, SignalOutcome::Win, dec!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));

        assert_eq!(store.metrics().await.unwrap(), before);
        assert_eq!(hammer_trades(&store).await, 29);
        let stored = store.list_signals(None).await.unwrap();
        assert_eq!(stored[0].outcome, None);

        // 같은 신호를 범위 안의 손익으로 다시 확정할 수 있음
        let resolution = store
            .set_signal_outcome(signal.id, SignalOutcome::Loss, dec!(-1))
            .await
            .unwrap()
            .into_resolution()
            .unwrap();
        assert_eq!(resolution.metrics.unwrap().total_profit, Decimal::MAX - dec!(1));
        assert_eq!(hammer_trades(&store).await, 30);
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_noop() {
        let store = seeded();
        let before = store.metrics().await.unwrap();

        let update = store
            .set_signal_outcome(999, SignalOutcome::Win, dec!(10))
            .await
            .unwrap();
        assert_eq!(update, OutcomeUpdate::Unknown);
        assert_eq!(store.metrics().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_toggle_strategy() {
        let store = seeded();

        let updated = store.set_strategy_enabled(8, true).await.unwrap().unwrap();
        assert_eq!(updated.name, "RSI + EMA Confluence");
        assert!(updated.enabled);

        let before = store.list_strategies().await.unwrap();
        assert!(store.set_strategy_enabled(999, false).await.unwrap().is_none());
        assert_eq!(store.list_strategies().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_metrics_absent_until_initialized() {
        let store = MemoryStore::default();
        assert!(store.metrics().await.unwrap().is_none());
        assert!(store
            .merge_metrics(MetricsPatch::platform("bybit"))
            .await
            .unwrap()
            .is_none());

        let metrics = store.initialize_metrics("quotex").await;
        assert_eq!(metrics.platform, "quotex");
        assert_eq!(store.initialize_metrics("bybit").await.platform, "quotex");
    }

    #[tokio::test]
    async fn test_merge_metrics_idempotent() {
        let store = seeded();
        let patch = MetricsPatch {
            total_signals: Some(5),
            ..Default::default()
        };

        store.merge_metrics(patch.clone()).await.unwrap();
        let metrics = store.merge_metrics(patch).await.unwrap().unwrap();
        assert_eq!(metrics.total_signals, 5);
    }

    #[tokio::test]
    async fn test_duplicate_strategy_rejected() {
        let store = seeded();
        let err = store
            .add_strategy("Smart Money Concepts", "dup", true)
            .await
            .unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));

        let added = store.add_strategy("Breakout Retest", "new", false).await.unwrap();
        assert_eq!(added.id, 10);
        assert_eq!(added.total_trades(), 0);
    }

    #[tokio::test]
    async fn test_demo_seed() {
        let store = MemoryStore::from_config(&StoreConfig::default()).unwrap();

        let metrics = store.metrics().await.unwrap().unwrap();
        assert_eq!(metrics.total_signals, 231);
        assert_eq!(metrics.total_profit, dec!(2847.50));
        assert_eq!(metrics.platform, "quotex");

        let signals = store.list_signals(None).await.unwrap();
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].pair, "EUR/USD");
        assert!(signals.iter().all(|s| s.executed && s.is_win()));

        let next = store.create_signal(new_signal("A")).await.unwrap();
        assert_eq!(next.id, 12);
    }

    #[tokio::test]
    async fn test_today_stats() {
        let store = seeded();
        let a = store.create_signal(new_signal("A")).await.unwrap();
        store.create_signal(new_signal("B")).await.unwrap();
        store
            .create_signal_at(new_signal("C"), Utc::now() - Duration::days(2))
            .await
            .unwrap();

        let stats = store.today_stats().await.unwrap();
        assert_eq!(stats.today_signals, 2);
        assert_eq!(stats.success_rate, 0.0);
        assert_eq!(stats.total_profit, Decimal::ZERO);

        store
            .set_signal_outcome(a.id, SignalOutcome::Win, dec!(15))
            .await
            .unwrap();
        let stats = store.today_stats().await.unwrap();
        assert_eq!(stats.won, 1);
        // 대기 중인 B도 분모에 포함
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.total_profit, dec!(15));
        // 시스템 승률은 확정된 신호만 기준
        assert_eq!(store.metrics().await.unwrap().unwrap().win_rate, 100.0);
    }
}
