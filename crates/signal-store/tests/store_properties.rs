//! 저장소 동시성 및 ID 단조성 통합 테스트.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal_macros::dec;
use signal_core::{Direction, NewSignal, SignalOutcome, StoreConfig};
use signal_store::{MemoryStore, SignalStore};
use tokio::sync::Barrier;

fn new_signal(pair: &str, confidence: f64) -> NewSignal {
    NewSignal::new(pair, Direction::Sell, "Volume Spike Hammer", confidence, 2)
}

fn seeded() -> Arc<dyn SignalStore> {
    let config = StoreConfig {
        seed_demo_data: false,
        ..Default::default()
    };
    Arc::new(MemoryStore::from_config(&config).unwrap())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_bump_total_signals_exactly() {
    let store = seeded();
    let tasks = 16;
    let barrier = Arc::new(Barrier::new(tasks));

    let handles: Vec<_> = (0..tasks)
        .map(|i| {
            let store = store.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                store
                    .create_signal(new_signal("EUR/USD", 80.0 + i as f64))
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap().id);
    }
    assert_eq!(ids.len(), tasks);

    let metrics = store.metrics().await.unwrap().unwrap();
    assert_eq!(metrics.total_signals, tasks as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_keep_counters_consistent() {
    let store = seeded();
    let mut ids = Vec::new();
    for _ in 0..20 {
        ids.push(store.create_signal(new_signal("AUD/USD", 85.0)).await.unwrap().id);
    }

    let barrier = Arc::new(Barrier::new(ids.len()));
    let handles: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let store = store.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                let (outcome, pnl) = if i % 4 == 0 {
                    (SignalOutcome::Loss, dec!(-10))
                } else {
                    (SignalOutcome::Win, dec!(20))
                };
                store.set_signal_outcome(id, outcome, pnl).await
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_applied());
    }

    let strategies = store.list_strategies().await.unwrap();
    let hammer = strategies
        .iter()
        .find(|s| s.name == "Volume Spike Hammer")
        .unwrap();
    assert_eq!(hammer.total_trades(), 29 + 20);
    assert_eq!(hammer.total_wins(), 28 + 15);

    let metrics = store.metrics().await.unwrap().unwrap();
    assert_eq!(metrics.total_profit, dec!(250));
    assert!((metrics.win_rate - 75.0).abs() < 1e-9);

    let stats = store.today_stats().await.unwrap();
    assert_eq!(stats.won, 15);
    assert_eq!(stats.lost, 5);
    assert_eq!(stats.total_profit, dec!(250));
}

proptest! {
    #[test]
    fn ids_strictly_increase(confidences in prop::collection::vec(0.0f64..=100.0, 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = MemoryStore::default();
            let mut last = 0u64;
            for confidence in confidences {
                let signal = store.create_signal(new_signal("USD/CHF", confidence)).await.unwrap();
                prop_assert!(signal.id > last);
                last = signal.id;
            }

            let strategy = store.add_strategy("Late Addition", "", true).await.unwrap();
            prop_assert!(strategy.id > last);
            Ok(())
        })?;
    }

    #[test]
    fn resolution_counter_transition(trades in 0u64..500, wins_seed in 0u64..500, win in any::<bool>()) {
        let wins = wins_seed.min(trades);
        let strategy = signal_core::Strategy::new(1, "S", "", true).with_record(trades, wins);
        let mut next = strategy.clone();
        signal_store::aggregator::record_trade(&mut next, win);

        prop_assert_eq!(next.total_trades(), trades + 1);
        let expected_wins = if win { wins + 1 } else { wins };
        prop_assert_eq!(next.total_wins(), expected_wins);
        let expected_rate = expected_wins as f64 / (trades + 1) as f64 * 100.0;
        prop_assert!((next.win_rate() - expected_rate).abs() < 1e-9);
        prop_assert!(next.total_wins() <= next.total_trades());
    }
}
