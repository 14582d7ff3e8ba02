//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 상태 저장소와 WebSocket 레지스트리를 묶어 REST 핸들러,
//! WebSocket handler, 백그라운드 태스크가 같은 인스턴스를 보도록 합니다.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use signal_core::{HubConfig, HubResult};
use signal_store::{MemoryStore, SignalStore};

use crate::websocket::{create_registry, BroadcastReport, HubEvent, SharedRegistry};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 `Arc<AppState>` 형태로 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 신호/전략/메트릭 저장소
    pub store: Arc<dyn SignalStore>,

    /// WebSocket 연결 레지스트리 - 실시간 이벤트 브로드캐스트
    pub registry: SharedRegistry,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: DateTime<Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `store` - 상태 저장소
    /// * `registry` - WebSocket 연결 레지스트리
    pub fn new(store: Arc<dyn SignalStore>, registry: SharedRegistry) -> Self {
        Self {
            store,
            registry,
            started_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 설정에서 메모리 저장소와 레지스트리를 만들어 상태를 구성합니다.
    ///
    /// # Errors
    ///
    /// 시드 데이터 구성 실패 시 에러를 반환합니다.
    pub fn from_config(config: &HubConfig) -> HubResult<Self> {
        let store = MemoryStore::from_config(&config.store)?;
        let registry = create_registry(config.broadcast.mailbox_capacity);

        info!(
            mailbox_capacity = config.broadcast.mailbox_capacity,
            "Application state initialized"
        );
        Ok(Self::new(Arc::new(store), registry))
    }

    /// 연결된 모든 클라이언트에게 이벤트를 전송합니다.
    ///
    /// 전송 실패는 해당 연결 제거로만 처리됩니다.
    pub async fn broadcast(&self, event: HubEvent) -> BroadcastReport {
        self.registry.publish(event).await
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 전략 카탈로그와 초기 메트릭만 채워진 상태를 생성합니다. 데모 신호는 포함되지 않습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use signal_core::StoreConfig;

    let config = StoreConfig {
        seed_demo_data: false,
        ..StoreConfig::default()
    };
    let store = MemoryStore::from_config(&config).expect("Failed to seed test store");
    AppState::new(Arc::new(store), create_registry(64))
}
