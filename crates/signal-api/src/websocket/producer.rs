//! 데모 신호 생성기.
//!
//! 고정 주기로 임의의 신호를 합성해 저장소에 커밋하고 브로드캐스트합니다.
//! `pause_when_stopped`가 켜져 있으면 봇이 중지 상태인 동안 주기를 건너뜁니다.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Instrument};

use signal_core::{
    signal_span, BotStatus, Direction, HubError, HubResult, NewSignal, ProducerConfig, Signal,
};
use signal_store::SignalStore;

use super::messages::HubEvent;
use super::registry::SharedRegistry;
use crate::metrics::{record_cycle_failure, record_signal_produced};

/// 생성 대상 통화쌍.
pub const PAIRS: [&str; 5] = ["EUR/USD", "GBP/JPY", "USD/JPY", "AUD/USD", "USD/CHF"];

/// 생성 대상 전략.
pub const STRATEGIES: [&str; 4] = [
    "Super Bullish Candle",
    "Super Bearish Candle",
    "Volume Spike Hammer",
    "Heikin Ashi Trend Flip",
];

const PATTERN_NOTE: &str = "Pattern detected";
const SUPPORT_RESISTANCE_NOTE: &str = "S/R level identified";

/// 한 주기의 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// 신호를 커밋하고 브로드캐스트함
    Produced(Signal),
    /// 봇 중지 상태라 건너뜀
    Skipped,
}

/// 신호 생성기.
pub struct SignalProducer<R = StdRng> {
    store: Arc<dyn SignalStore>,
    registry: SharedRegistry,
    rng: R,
    pause_when_stopped: bool,
}

impl SignalProducer<StdRng> {
    /// 엔트로피 시드 RNG로 생성기 생성.
    pub fn new(store: Arc<dyn SignalStore>, registry: SharedRegistry) -> Self {
        Self::with_rng(store, registry, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> SignalProducer<R> {
    /// 주어진 RNG로 생성기 생성.
    pub fn with_rng(store: Arc<dyn SignalStore>, registry: SharedRegistry, rng: R) -> Self {
        Self {
            store,
            registry,
            rng,
            pause_when_stopped: true,
        }
    }

    /// 봇 중지 상태에서 주기를 건너뛸지 설정.
    pub fn with_pause_when_stopped(mut self, pause: bool) -> Self {
        self.pause_when_stopped = pause;
        self
    }

    /// 임의의 신호 입력값을 합성합니다.
    pub fn synthesize(&mut self) -> NewSignal {
        let pair = PAIRS[self.rng.gen_range(0..PAIRS.len())];
        let strategy = STRATEGIES[self.rng.gen_range(0..STRATEGIES.len())];
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Buy
        } else {
            Direction::Sell
        };
        let confidence = self.rng.gen_range(80..=100u32);
        let duration = self.rng.gen_range(1..=5u32);

        NewSignal::new(pair, direction, strategy, f64::from(confidence), duration)
            .with_notes(PATTERN_NOTE, SUPPORT_RESISTANCE_NOTE)
    }

    /// 한 주기를 실행합니다.
    ///
    /// # Errors
    ///
    /// 저장소 연산 실패 시 `HubError::Cycle`을 반환합니다. 호출자는 로그만 남기고
    /// 다음 주기로 진행합니다.
    pub async fn run_cycle(&mut self) -> HubResult<CycleOutcome> {
        if self.pause_when_stopped {
            let metrics = self.store.metrics().await.map_err(cycle_error)?;
            if metrics.is_some_and(|m| m.bot_status == BotStatus::Stopped) {
                debug!("Bot stopped, producer cycle skipped");
                return Ok(CycleOutcome::Skipped);
            }
        }

        let new = self.synthesize();
        let span = signal_span!("produce_signal", new.pair, new.strategy);
        let signal = self
            .store
            .create_signal(new)
            .instrument(span)
            .await
            .map_err(cycle_error)?;
        record_signal_produced(&signal.strategy);
        info!(
            signal_id = signal.id,
            pair = %signal.pair,
            direction = %signal.direction,
            strategy = %signal.strategy,
            "Signal produced"
        );

        self.registry
            .publish(HubEvent::NewSignal(signal.clone()))
            .await;
        if let Some(metrics) = self.store.metrics().await.map_err(cycle_error)? {
            self.registry.publish(HubEvent::MetricsUpdated(metrics)).await;
        }

        Ok(CycleOutcome::Produced(signal))
    }

    /// 생성기 메인 루프.
    ///
    /// 첫 주기는 시작 후 `period`가 지난 뒤 실행됩니다.
    pub async fn run(mut self, period: Duration, shutdown: CancellationToken) {
        info!(interval = ?period, "Signal producer started");

        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        error!(error = %e, "Producer cycle failed");
                        record_cycle_failure("producer");
                    }
                }
                _ = shutdown.cancelled() => {
                    info!("Signal producer stopped");
                    break;
                }
            }
        }
    }
}

fn cycle_error(err: HubError) -> HubError {
    HubError::Cycle(format!("producer: {}", err))
}

/// 생성기를 백그라운드로 시작.
pub fn start_producer(
    store: Arc<dyn SignalStore>,
    registry: SharedRegistry,
    config: &ProducerConfig,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let producer = SignalProducer::new(store, registry)
        .with_pause_when_stopped(config.pause_when_stopped);
    let period = config.interval();

    tokio::spawn(async move {
        producer.run(period, shutdown).await;
    })
}
