//! 백그라운드 태스크 모듈.
//!
//! 서버 실행 중 주기적으로 실행되는 작업의 수명을 관리합니다.
//! - 신호 생성기: 고정 주기로 데모 신호 커밋 및 브로드캐스트
//! - 생존 확인: 고정 주기로 연결에 핑을 보내고 끊긴 연결 제거

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use signal_core::HubConfig;

use crate::state::AppState;
use crate::websocket::{start_liveness_monitor, start_producer};

/// 백그라운드 태스크 관리자.
pub struct BackgroundTasks {
    token: CancellationToken,
    handles: Vec<(&'static str, JoinHandle<()>)>,
}

impl BackgroundTasks {
    /// 설정에 따라 백그라운드 태스크를 시작합니다.
    pub fn start(state: &AppState, config: &HubConfig) -> Self {
        let token = CancellationToken::new();
        let mut handles = Vec::new();

        if config.producer.enabled {
            handles.push((
                "producer",
                start_producer(
                    state.store.clone(),
                    state.registry.clone(),
                    &config.producer,
                    token.child_token(),
                ),
            ));
        } else {
            info!("Signal producer disabled");
        }

        handles.push((
            "liveness",
            start_liveness_monitor(
                state.registry.clone(),
                config.liveness.interval(),
                token.child_token(),
            ),
        ));

        info!(tasks = handles.len(), "Background tasks started");
        Self { token, handles }
    }

    /// 종료 시그널용 토큰.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 실행 중인 태스크 수.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 모든 태스크에 종료를 알리고 제한 시간 안에서 완료를 기다립니다.
    pub async fn shutdown(self, timeout: Duration) {
        self.token.cancel();

        for (name, handle) in self.handles {
            match tokio::time::timeout(timeout, handle).await {
                Ok(Ok(())) => info!(task = name, "Background task stopped"),
                Ok(Err(e)) => warn!(task = name, error = %e, "Background task panicked"),
                Err(_) => warn!(task = name, "Background task did not stop in time"),
            }
        }
    }
}
