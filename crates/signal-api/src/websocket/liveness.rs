//! 연결 생존 확인.
//!
//! 주기적으로 OPEN 연결에 핑을 보내고 닫힌 연결을 제거합니다.
//! 퐁 응답 시간 제한은 두지 않으며, 퐁은 handler에서 debug 로그로만 남깁니다.

use std::time::Duration;

use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::registry::{ProbeReport, SharedRegistry};

/// 생존 확인 모니터.
pub struct LivenessMonitor {
    registry: SharedRegistry,
}

impl LivenessMonitor {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// 한 번의 프로브를 실행합니다.
    pub async fn probe_once(&self) -> ProbeReport {
        let report = self.registry.probe().await;
        debug!(
            probed = report.probed,
            evicted = report.evicted,
            "Liveness probe completed"
        );
        report
    }

    /// 모니터 메인 루프.
    pub async fn run(self, period: Duration, shutdown: CancellationToken) {
        info!(interval = ?period, "Liveness monitor started");

        let mut ticker = interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.probe_once().await;
                }
                _ = shutdown.cancelled() => {
                    info!("Liveness monitor stopped");
                    break;
                }
            }
        }
    }
}

/// 생존 확인 모니터를 백그라운드로 시작.
pub fn start_liveness_monitor(
    registry: SharedRegistry,
    period: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let monitor = LivenessMonitor::new(registry);

    tokio::spawn(async move {
        monitor.run(period, shutdown).await;
    })
}
