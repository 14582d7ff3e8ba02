//! WebSocket 연결 handler.
//!
//! 업그레이드된 소켓을 송신 태스크와 수신 태스크로 나누어 처리합니다.
//! 클라이언트는 애플리케이션 메시지를 보내지 않으며, 수신된 텍스트는 무시됩니다.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use signal_core::HubError;

use super::registry::{Outbound, SharedRegistry};
use crate::state::AppState;

/// WebSocket 업그레이드 핸들러.
///
/// # 엔드포인트
///
/// `GET /ws`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// WebSocket 연결 처리.
async fn handle_socket(socket: WebSocket, registry: SharedRegistry) {
    let (connection_id, mut mailbox) = match registry.register().await {
        Ok(registered) => registered,
        Err(e) => {
            warn!(error = %HubError::from(e), "Failed to register connection");
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();

    // 메일박스 → 소켓 송신 태스크
    let send_registry = registry.clone();
    let send_task = tokio::spawn(async move {
        while let Some(outbound) = mailbox.recv().await {
            let message = match outbound {
                Outbound::Event(text) => Message::Text(text.as_ref().into()),
                Outbound::Ping => Message::Ping(Bytes::new()),
            };
            if let Err(e) = sender.send(message).await {
                let err = HubError::Transport(e.to_string());
                warn!(%connection_id, error = %err, "WebSocket send failed");
                send_registry.mark_closed(connection_id).await;
                break;
            }
        }
        let _ = sender.close().await;
    });

    // 클라이언트 메시지 수신 태스크
    let recv_registry = registry.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    debug!(%connection_id, len = text.len(), "Inbound text ignored");
                }
                Ok(Message::Binary(_)) => {
                    debug!(%connection_id, "Inbound binary ignored");
                }
                Ok(Message::Pong(_)) => {
                    debug!(%connection_id, "Received pong");
                }
                Ok(Message::Ping(_)) => {}
                Ok(Message::Close(_)) => {
                    debug!(%connection_id, "Close message received");
                    break;
                }
                Err(e) => {
                    let err = HubError::Transport(e.to_string());
                    warn!(%connection_id, error = %err, "WebSocket receive error");
                    recv_registry.mark_closed(connection_id).await;
                    break;
                }
            }
        }
    });

    // 하나의 태스크가 종료되면 다른 것도 종료
    tokio::select! {
        _ = send_task => {
            debug!(%connection_id, "Send task ended");
        }
        _ = recv_task => {
            debug!(%connection_id, "Receive task ended");
        }
    }

    registry.close(connection_id).await;
    info!(%connection_id, "WebSocket disconnected");
}
