//! WebSocket 연결 레지스트리와 브로드캐스터.
//!
//! 연결마다 제한된 크기의 송신 메일박스를 두고, 브로드캐스트는 절대 대기하지 않습니다.
//!
//! # 브로드캐스트 단계
//!
//! 1. 읽기 잠금으로 연결 스냅샷 확보
//! 2. OPEN 연결에 `try_send`, 닫힌 연결은 제거 대상으로 수집
//! 3. 쓰기 잠금을 한 번 잡고 수집된 연결 제거
//!
//! 메일박스가 가득 찬 연결은 해당 메시지만 누락되고 제거되지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::messages::{HubEvent, WsError};
use crate::metrics::{record_broadcast, set_websocket_connections};

/// 연결 식별자.
pub type ConnectionId = Uuid;

/// 연결 상태.
///
/// HTTP 업그레이드가 끝나기 전(CONNECTING)에는 레지스트리에 존재하지 않으며,
/// 등록과 동시에 OPEN이 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    /// 이벤트 수신 가능
    Open,
    /// 전송 실패로 종료됨 (다음 브로드캐스트/프로브에서 제거)
    Closed,
}

/// 연결 메일박스에 들어가는 송신 항목.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// 직렬화된 이벤트 (연결 간 공유)
    Event(Arc<str>),
    /// 생존 확인 핑
    Ping,
}

/// 브로드캐스트 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 메일박스에 들어간 연결 수
    pub delivered: usize,
    /// 제거된 연결 수
    pub evicted: usize,
    /// 메일박스가 가득 차 누락된 연결 수
    pub dropped: usize,
}

/// 생존 확인 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeReport {
    /// 핑을 보낸 연결 수
    pub probed: usize,
    /// 제거된 연결 수
    pub evicted: usize,
}

#[derive(Debug)]
struct Connection {
    state: ConnectionState,
    mailbox: mpsc::Sender<Outbound>,
    connected_at: DateTime<Utc>,
}

/// 연결 레지스트리.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    mailbox_capacity: usize,
}

impl ConnectionRegistry {
    /// 새로운 레지스트리 생성.
    ///
    /// # Arguments
    ///
    /// * `mailbox_capacity` - 연결별 송신 메일박스 크기
    pub fn new(mailbox_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            mailbox_capacity: mailbox_capacity.max(1),
        }
    }

    /// 새 연결을 OPEN 상태로 등록하고 연결 확인 이벤트를 넣습니다.
    ///
    /// 확인 이벤트는 삽입과 같은 쓰기 잠금 안에서 들어가므로, 이후의 어떤
    /// 브로드캐스트보다도 먼저 전달됩니다.
    ///
    /// # Returns
    ///
    /// 연결 ID와 송신 메일박스 수신기
    pub async fn register(&self) -> Result<(ConnectionId, mpsc::Receiver<Outbound>), WsError> {
        let confirmation: Arc<str> = HubEvent::connection_confirmed().to_json()?.into();
        let (tx, rx) = mpsc::channel(self.mailbox_capacity);
        let id = Uuid::new_v4();

        let mut connections = self.connections.write().await;
        tx.try_send(Outbound::Event(confirmation))
            .map_err(|_| WsError::MailboxClosed(id))?;
        connections.insert(
            id,
            Connection {
                state: ConnectionState::Open,
                mailbox: tx,
                connected_at: Utc::now(),
            },
        );
        set_websocket_connections(connections.len());

        info!(connection_id = %id, total = connections.len(), "WebSocket connection opened");
        Ok((id, rx))
    }

    /// 연결을 CLOSED로 표시합니다. 제거는 다음 브로드캐스트/프로브에서 이뤄집니다.
    pub async fn mark_closed(&self, id: ConnectionId) {
        if let Some(connection) = self.connections.write().await.get_mut(&id) {
            connection.state = ConnectionState::Closed;
        }
    }

    /// 연결을 즉시 제거합니다.
    ///
    /// # Returns
    ///
    /// 연결이 존재했으면 `true`
    pub async fn close(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        let removed = connections.remove(&id);
        set_websocket_connections(connections.len());

        if let Some(connection) = &removed {
            let lifetime = Utc::now() - connection.connected_at;
            info!(
                connection_id = %id,
                lifetime_secs = lifetime.num_seconds(),
                total = connections.len(),
                "WebSocket connection removed"
            );
        }
        removed.is_some()
    }

    /// 이벤트를 모든 OPEN 연결에 팬아웃합니다.
    ///
    /// 전송 실패는 해당 연결 제거로만 처리되며 호출자에게 전파되지 않습니다.
    ///
    /// # Errors
    ///
    /// 이벤트 직렬화 실패 시에만 에러를 반환합니다.
    pub async fn broadcast(&self, event: &HubEvent) -> Result<BroadcastReport, WsError> {
        let payload: Arc<str> = event.to_json()?.into();
        let snapshot = self.snapshot().await;

        let mut report = BroadcastReport::default();
        let mut stale = Vec::new();

        for (id, state, mailbox) in snapshot {
            match state {
                ConnectionState::Open => match mailbox.try_send(Outbound::Event(payload.clone())) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(connection_id = %id, event = event.event_type(), "Mailbox full, event dropped");
                        report.dropped += 1;
                    }
                    Err(TrySendError::Closed(_)) => stale.push(id),
                },
                ConnectionState::Closed => stale.push(id),
            }
        }

        report.evicted = self.evict(&stale).await;
        record_broadcast(event.event_type(), report.delivered, report.evicted, report.dropped);

        debug!(
            event = event.event_type(),
            delivered = report.delivered,
            evicted = report.evicted,
            dropped = report.dropped,
            "Event broadcast"
        );
        Ok(report)
    }

    /// 브로드캐스트 후 직렬화 에러를 로그로 남기고 결과만 반환합니다.
    pub async fn publish(&self, event: HubEvent) -> BroadcastReport {
        match self.broadcast(&event).await {
            Ok(report) => report,
            Err(e) => {
                error!(event = event.event_type(), error = %e, "Failed to broadcast event");
                BroadcastReport::default()
            }
        }
    }

    /// 모든 OPEN 연결에 핑을 넣고 닫힌 연결을 제거합니다.
    pub async fn probe(&self) -> ProbeReport {
        let snapshot = self.snapshot().await;

        let mut report = ProbeReport::default();
        let mut stale = Vec::new();

        for (id, state, mailbox) in snapshot {
            match state {
                ConnectionState::Open => match mailbox.try_send(Outbound::Ping) {
                    Ok(()) => report.probed += 1,
                    Err(TrySendError::Full(_)) => {
                        debug!(connection_id = %id, "Mailbox full, ping skipped");
                    }
                    Err(TrySendError::Closed(_)) => stale.push(id),
                },
                ConnectionState::Closed => stale.push(id),
            }
        }

        report.evicted = self.evict(&stale).await;
        report
    }

    /// 등록된 연결 수.
    pub async fn client_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// OPEN 상태 연결 수.
    pub async fn open_count(&self) -> usize {
        self.connections
            .read()
            .await
            .values()
            .filter(|c| c.state == ConnectionState::Open)
            .count()
    }

    async fn snapshot(&self) -> Vec<(ConnectionId, ConnectionState, mpsc::Sender<Outbound>)> {
        self.connections
            .read()
            .await
            .iter()
            .map(|(id, c)| (*id, c.state, c.mailbox.clone()))
            .collect()
    }

    async fn evict(&self, ids: &[ConnectionId]) -> usize {
        if ids.is_empty() {
            return 0;
        }

        let mut connections = self.connections.write().await;
        let evicted = ids
            .iter()
            .filter(|id| connections.remove(*id).is_some())
            .count();
        set_websocket_connections(connections.len());

        if evicted > 0 {
            info!(evicted, total = connections.len(), "Stale connections evicted");
        }
        evicted
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(256)
    }
}

/// 공유 가능한 레지스트리 타입.
pub type SharedRegistry = Arc<ConnectionRegistry>;

/// 새로운 공유 레지스트리 생성.
pub fn create_registry(mailbox_capacity: usize) -> SharedRegistry {
    Arc::new(ConnectionRegistry::new(mailbox_capacity))
}
