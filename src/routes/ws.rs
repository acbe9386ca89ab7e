//! WebSocket Routes
//!
//! actor별 ledger 이벤트 실시간 푸시
//!
//! # Endpoints
//! - `GET /ws/:actor_id` - WebSocket 연결

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crate::services::{ConnectionInfo, NotificationHub, WsMessage};
use crate::AppState;

/// WebSocket 업그레이드 핸들러
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(actor_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub, actor_id))
}

/// WebSocket 연결 처리
async fn handle_socket(socket: WebSocket, hub: Arc<NotificationHub>, actor_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // 연결 등록 → 채널 구독 (순서 바뀌면 다른 소켓의 해제가 채널을 지울 수 있음)
    let conn_id = uuid::Uuid::new_v4().to_string();
    hub.register_connection(ConnectionInfo {
        id: conn_id.clone(),
        actor_id: actor_id.clone(),
        connected_at: chrono::Utc::now(),
    })
    .await;

    let mut events = hub.subscribe(&actor_id).await;
    tracing::info!("Connection {} opened for actor {}", conn_id, actor_id);

    let subscribed = WsMessage::Subscribed { actor_id: actor_id.clone() };
    if send_json(&mut sender, &subscribed).await.is_err() {
        hub.unregister_connection(&conn_id).await;
        return;
    }

    // 이 연결에만 보내는 응답 (Pong)
    let (reply_tx, mut reply_rx) = mpsc::channel::<WsMessage>(8);

    // 수신 태스크
    let conn_id_clone = conn_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Ping) => {
                        if reply_tx.send(WsMessage::Pong).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Connection {} sent unknown message: {}", conn_id_clone, e);
                        let error = WsMessage::Error {
                            code: 400,
                            message: "Unsupported client message".to_string(),
                        };
                        if reply_tx.send(error).await.is_err() {
                            break;
                        }
                    }
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // 송신 태스크
    let conn_id_clone = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(msg) => {
                        if send_json(&mut sender, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Connection {} lagged, {} events dropped", conn_id_clone, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },

                Some(reply) = reply_rx.recv() => {
                    if send_json(&mut sender, &reply).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // 한쪽이 끝나면 다른 쪽도 종료
    tokio::select! {
        _ = &mut recv_task => {
            send_task.abort();
            // 채널 receiver가 drop된 뒤에 해제해야 채널 정리 판단이 맞음
            let _ = send_task.await;
        }
        _ = &mut send_task => recv_task.abort(),
    }

    // 연결 해제
    hub.unregister_connection(&conn_id).await;
    tracing::info!("Connection {} closed", conn_id);
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &WsMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize ws message: {}", e);
            Ok(())
        }
    }
}

/// 클라이언트 메시지 타입
#[derive(Debug, serde::Deserialize)]
#[serde(tag = "action")]
enum ClientMessage {
    Ping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_deserialize() {
        let json = r#"{"action":"Ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        let json = r#"{"action":"Subscribe","channel":"pool_status"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }
}
